//! Projection of line diff spans onto byte-offset edits.
//!
//! Offsets address the old document. Every edit ends on a line boundary: the
//! end of a span's last line is snapped to the start of the following line, or
//! to the end of the text when the span runs to the last line.

use reweave_text::{DiffKind, DiffSpan, LineIndex, TextError};

/// Replace old bytes `start..end` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedEdit {
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

impl ProjectedEdit {
    #[must_use]
    pub fn new(start: usize, end: usize, new_text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            new_text: new_text.into(),
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.start == self.end && self.new_text.is_empty()
    }
}

/// A span that could not be projected, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedSpan {
    pub span: DiffSpan,
    pub error: TextError,
}

/// The projectable part of a diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub edits: Vec<ProjectedEdit>,
    pub dropped: Vec<DroppedSpan>,
}

/// Projects spans computed between `old` and `new` onto `old`.
#[derive(Debug, Clone, Copy)]
pub struct EditProjector<'a> {
    old: &'a LineIndex<'a>,
    new: &'a LineIndex<'a>,
}

impl<'a> EditProjector<'a> {
    #[must_use]
    pub fn new(old: &'a LineIndex<'a>, new: &'a LineIndex<'a>) -> Self {
        Self { old, new }
    }

    /// Edit for one span; `None` for spans that change nothing.
    pub fn project(&self, span: &DiffSpan) -> Result<Option<ProjectedEdit>, TextError> {
        let edit = match span.kind() {
            DiffKind::Empty => return Ok(None),
            DiffKind::Delete => {
                let (start, end) = self.old_bounds(span)?;
                ProjectedEdit::new(start, end, "")
            }
            DiffKind::Insert => {
                let at = self.old.offset_of_line(span.old.start)?;
                ProjectedEdit::new(at, at, self.new_text(span)?)
            }
            DiffKind::Replace => {
                let (start, end) = self.old_bounds(span)?;
                ProjectedEdit::new(start, end, self.new_text(span)?)
            }
        };
        Ok(Some(edit))
    }

    /// Project every span, dropping the ones that reference lines outside
    /// either text.
    #[must_use]
    pub fn project_all(&self, spans: &[DiffSpan]) -> Projection {
        let mut projection = Projection::default();
        for span in spans {
            match self.project(span) {
                Ok(Some(edit)) => projection.edits.push(edit),
                Ok(None) => {}
                Err(error) => {
                    tracing::debug!(
                        old = ?span.old,
                        new = ?span.new,
                        %error,
                        "dropping diff span that cannot be projected"
                    );
                    projection.dropped.push(DroppedSpan {
                        span: span.clone(),
                        error,
                    });
                }
            }
        }
        projection
    }

    fn old_bounds(&self, span: &DiffSpan) -> Result<(usize, usize), TextError> {
        let start = self.old.offset_of_line(span.old.start)?;
        let end = self.old.start_of_line_or_end_of_previous_line(span.old.end)?;
        Ok((start, end))
    }

    fn new_text(&self, span: &DiffSpan) -> Result<&'a str, TextError> {
        let start = self.new.offset_of_line(span.new.start)?;
        let end = self.new.start_of_line_or_end_of_previous_line(span.new.end)?;
        self.new.slice(start, end)
    }
}
