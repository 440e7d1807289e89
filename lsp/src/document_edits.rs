//! Edits collected against one document snapshot.
//!
//! Edits are stored as byte ranges of the snapshot they were created for. In
//! tracked mode callers address the document as it looks after every edit
//! appended so far; each new edit is rebased onto the snapshot and merged with
//! the stored edits it touches, so the stored list stays sorted and disjoint.

use reweave_text::{TextError, check_offset};
use reweave_types::{PositionEncoding, Range, TextEdit};

use crate::projector::ProjectedEdit;
use crate::registry::DocumentSnapshot;
use crate::types::EditError;

/// Accumulates offset edits for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEdits {
    document: DocumentSnapshot,
    track_positions: bool,
    edits: Vec<ProjectedEdit>,
    /// Length of the edited text; maintained in tracked mode only.
    current_len: usize,
}

impl DocumentEdits {
    #[must_use]
    pub fn new(document: DocumentSnapshot, track_positions: bool) -> Self {
        let current_len = document.content().len();
        Self {
            document,
            track_positions,
            edits: Vec::new(),
            current_len,
        }
    }

    /// Rebuild an accumulator from protocol edits addressed to `document`.
    ///
    /// Each edit becomes an insert (empty range), a delete (empty text) or a
    /// replace.
    pub fn from_text_edits(
        document: DocumentSnapshot,
        edits: &[TextEdit],
        encoding: PositionEncoding,
    ) -> Result<Self, EditError> {
        let offsets = {
            let index = document.line_index();
            edits
                .iter()
                .map(|edit| {
                    let start = index.offset_of_position(edit.range.start, encoding)?;
                    let end = index.offset_of_position(edit.range.end, encoding)?;
                    Ok((start, end, edit.new_text.as_str()))
                })
                .collect::<Result<Vec<_>, TextError>>()?
        };

        let mut accumulator = Self::new(document, false);
        for (start, end, text) in offsets {
            match (start == end, text.is_empty()) {
                (true, _) => accumulator.insert(start, text)?,
                (false, true) => accumulator.delete(start, end)?,
                (false, false) => accumulator.replace(start, end, text)?,
            }
        }
        Ok(accumulator)
    }

    #[must_use]
    pub fn document(&self) -> &DocumentSnapshot {
        &self.document
    }

    #[must_use]
    pub fn track_positions(&self) -> bool {
        self.track_positions
    }

    /// Stored edits, in snapshot coordinates.
    #[must_use]
    pub fn edits(&self) -> &[ProjectedEdit] {
        &self.edits
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn insert(&mut self, offset: usize, text: impl Into<String>) -> Result<(), EditError> {
        self.replace(offset, offset, text)
    }

    pub fn delete(&mut self, start: usize, end: usize) -> Result<(), EditError> {
        self.replace(start, end, String::new())
    }

    pub fn replace(
        &mut self,
        start: usize,
        end: usize,
        text: impl Into<String>,
    ) -> Result<(), EditError> {
        if start > end {
            return Err(TextError::InvertedRange { start, end }.into());
        }
        let text = text.into();
        if self.track_positions {
            self.replace_tracked(start, end, text)
        } else {
            let content = self.document.content();
            check_offset(content, start)?;
            check_offset(content, end)?;
            if start != end || !text.is_empty() {
                self.edits.push(ProjectedEdit::new(start, end, text));
            }
            Ok(())
        }
    }

    /// Append an edit in this accumulator's coordinate space.
    pub fn push(&mut self, edit: ProjectedEdit) -> Result<(), EditError> {
        self.replace(edit.start, edit.end, edit.new_text)
    }

    /// Render the edited text.
    pub fn apply(&self) -> Result<String, EditError> {
        let content = self.document.content();
        let mut out = String::with_capacity(content.len());
        let mut cursor = 0;
        for edit in self.sorted()? {
            out.push_str(&content[cursor..edit.start]);
            out.push_str(&edit.new_text);
            cursor = edit.end;
        }
        out.push_str(&content[cursor..]);
        Ok(out)
    }

    /// Protocol form of the stored edits, ascending by position.
    pub fn to_text_edits(
        &self,
        encoding: PositionEncoding,
        annotation_id: Option<&str>,
    ) -> Result<Vec<TextEdit>, EditError> {
        let index = self.document.line_index();
        self.sorted()?
            .into_iter()
            .map(|edit| {
                let start = index.position_of_offset(edit.start, encoding)?;
                let end = index.position_of_offset(edit.end, encoding)?;
                Ok(TextEdit::new(Range::new(start, end), edit.new_text.clone())
                    .with_annotation(annotation_id.map(str::to_string)))
            })
            .collect()
    }

    /// Stored edits sorted by start (stable), or the first overlapping pair.
    fn sorted(&self) -> Result<Vec<&ProjectedEdit>, EditError> {
        let mut sorted: Vec<&ProjectedEdit> = self.edits.iter().collect();
        sorted.sort_by_key(|edit| (edit.start, edit.end));
        if let Some(pair) = sorted.windows(2).find(|pair| pair[1].start < pair[0].end) {
            return Err(EditError::OverlappingEdits {
                first: pair[0].start..pair[0].end,
                second: pair[1].start..pair[1].end,
            });
        }
        Ok(sorted)
    }

    fn replace_tracked(&mut self, start: usize, end: usize, text: String) -> Result<(), EditError> {
        if end > self.current_len {
            return Err(TextError::OffsetOutOfRange {
                offset: end,
                len: self.current_len,
            }
            .into());
        }
        if start == end && text.is_empty() {
            return Ok(());
        }

        let inserted = text.len();
        rebase(self.document.content(), &mut self.edits, start, end, text)?;
        self.current_len = self.current_len - (end - start) + inserted;
        Ok(())
    }
}

/// Fold the current-coordinate edit `start..end -> text` into `edits`.
///
/// `edits` is sorted and disjoint in `original` coordinates. Walking it keeps
/// an anchor pair (original offset, current offset) just past the last stored
/// edit seen; between stored edits the two coordinate spaces differ by a
/// constant.
fn rebase(
    original: &str,
    edits: &mut Vec<ProjectedEdit>,
    start: usize,
    end: usize,
    text: String,
) -> Result<(), TextError> {
    let (mut orig_cursor, mut cur_cursor) = (0, 0);

    let mut first = 0;
    while let Some(edit) = edits.get(first) {
        let cur_start = cur_cursor + (edit.start - orig_cursor);
        let cur_end = cur_start + edit.new_text.len();
        if cur_end >= start {
            break;
        }
        orig_cursor = edit.end;
        cur_cursor = cur_end;
        first += 1;
    }
    let (before_orig, before_cur) = (orig_cursor, cur_cursor);

    let mut last = first;
    while let Some(edit) = edits.get(last) {
        let cur_start = cur_cursor + (edit.start - orig_cursor);
        if cur_start > end {
            break;
        }
        orig_cursor = edit.end;
        cur_cursor = cur_start + edit.new_text.len();
        last += 1;
    }
    let (after_orig, after_cur) = (orig_cursor, cur_cursor);

    if first == last {
        let orig_start = before_orig + (start - before_cur);
        let orig_end = before_orig + (end - before_cur);
        check_offset(original, orig_start)?;
        check_offset(original, orig_end)?;
        edits.insert(first, ProjectedEdit::new(orig_start, orig_end, text));
        return Ok(());
    }

    let head_start = edits[first].start;
    let head_cur_start = before_cur + (head_start - before_orig);
    let (orig_start, region_cur_start) = if start < head_cur_start {
        (before_orig + (start - before_cur), start)
    } else {
        (head_start, head_cur_start)
    };
    let orig_end = if end > after_cur {
        after_orig + (end - after_cur)
    } else {
        after_orig
    };
    check_offset(original, orig_start)?;
    check_offset(original, orig_end)?;

    let mut region = String::new();
    let mut cursor = orig_start;
    for edit in &edits[first..last] {
        region.push_str(&original[cursor..edit.start]);
        region.push_str(&edit.new_text);
        cursor = edit.end;
    }
    region.push_str(&original[cursor..orig_end]);

    let (local_start, local_end) = (start - region_cur_start, end - region_cur_start);
    if !region.is_char_boundary(local_start) {
        return Err(TextError::NotCharBoundary { offset: start });
    }
    if !region.is_char_boundary(local_end) {
        return Err(TextError::NotCharBoundary { offset: end });
    }
    region.replace_range(local_start..local_end, &text);

    let merged = ProjectedEdit::new(orig_start, orig_end, region);
    edits.splice(first..last, (!merged.is_noop()).then_some(merged));
    Ok(())
}
