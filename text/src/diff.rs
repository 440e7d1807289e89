//! Line-granular diffing and diff stats.
//!
//! The diff algorithm itself is `similar`'s; this module decides what it is fed
//! (the [`LineIndex`] tokenization, so span line numbers and index line numbers
//! agree for every delimiter kind) and what comes out (ordered, non-overlapping
//! [`DiffSpan`]s covering only changed regions).

use std::ops::Range;

use serde::{Deserialize, Serialize};
use similar::{Algorithm, DiffTag};

use crate::LineIndex;

/// Which `similar` algorithm computes the edit script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    Myers,
    /// Anchors on unique lines, like a histogram diff. Default.
    #[default]
    Patience,
    Lcs,
}

impl DiffAlgorithm {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Myers => "myers",
            Self::Patience => "patience",
            Self::Lcs => "lcs",
        }
    }

    fn to_similar(self) -> Algorithm {
        match self {
            Self::Myers => Algorithm::Myers,
            Self::Patience => Algorithm::Patience,
            Self::Lcs => Algorithm::Lcs,
        }
    }
}

/// What a [`DiffSpan`] does, derived from which of its ranges are empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffKind {
    Delete,
    Insert,
    Replace,
    Empty,
}

/// One changed region: old lines `old` become new lines `new`.
///
/// Ranges are half-open line ranges into the old and new texts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiffSpan {
    pub old: Range<usize>,
    pub new: Range<usize>,
}

impl DiffSpan {
    #[must_use]
    pub fn new(old: Range<usize>, new: Range<usize>) -> Self {
        Self { old, new }
    }

    #[must_use]
    pub fn kind(&self) -> DiffKind {
        match (self.old.is_empty(), self.new.is_empty()) {
            (false, true) => DiffKind::Delete,
            (true, false) => DiffKind::Insert,
            (false, false) => DiffKind::Replace,
            (true, true) => DiffKind::Empty,
        }
    }
}

/// A line diff over two indexed texts.
///
/// Implementations return spans in ascending order of `old`, non-overlapping,
/// such that replacing each span's old lines with its new lines turns the old
/// text into the new one.
pub trait LineDiffer: Send + Sync {
    fn diff(&self, old: &LineIndex<'_>, new: &LineIndex<'_>) -> Vec<DiffSpan>;
}

/// [`LineDiffer`] backed by `similar`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarDiffer {
    algorithm: DiffAlgorithm,
}

impl SimilarDiffer {
    #[must_use]
    pub fn new(algorithm: DiffAlgorithm) -> Self {
        Self { algorithm }
    }

    #[must_use]
    pub fn algorithm(&self) -> DiffAlgorithm {
        self.algorithm
    }
}

impl LineDiffer for SimilarDiffer {
    fn diff(&self, old: &LineIndex<'_>, new: &LineIndex<'_>) -> Vec<DiffSpan> {
        let old_lines = old.diff_tokens();
        let new_lines = new.diff_tokens();
        let ops = similar::capture_diff_slices(self.algorithm.to_similar(), &old_lines, &new_lines);

        // Op indices are not trusted; positions come from running cursors
        // advanced by each op's lengths.
        let mut spans: Vec<DiffSpan> = Vec::new();
        let (mut old_at, mut new_at) = (0, 0);
        for op in &ops {
            let old_end = old_at + op.old_range().len();
            let new_end = new_at + op.new_range().len();
            if op.tag() != DiffTag::Equal {
                match spans.last_mut() {
                    Some(last) if last.old.end == old_at && last.new.end == new_at => {
                        last.old.end = old_end;
                        last.new.end = new_end;
                    }
                    _ => spans.push(DiffSpan::new(old_at..old_end, new_at..new_end)),
                }
            }
            old_at = old_end;
            new_at = new_end;
        }

        debug_assert_eq!((old_at, new_at), (old_lines.len(), new_lines.len()));
        debug_assert!(
            splice(&old_lines, &new_lines, &spans).as_deref() == Some(new.text()),
            "line diff does not reproduce the new text"
        );

        tracing::trace!(
            algorithm = self.algorithm.as_str(),
            old_lines = old_lines.len(),
            new_lines = new_lines.len(),
            spans = spans.len(),
            "line diff computed"
        );
        spans
    }
}

/// Diff two texts with the default algorithm.
#[must_use]
pub fn diff_lines(before: &str, after: &str) -> Vec<DiffSpan> {
    SimilarDiffer::default().diff(&LineIndex::new(before), &LineIndex::new(after))
}

/// Replace each span's old lines with its new lines. `None` when a span
/// reaches outside the token lists or goes backwards.
fn splice(old: &[&str], new: &[&str], spans: &[DiffSpan]) -> Option<String> {
    let mut out = String::new();
    let mut cursor = 0;
    for span in spans {
        out.extend(old.get(cursor..span.old.start)?.iter().copied());
        out.extend(new.get(span.new.clone())?.iter().copied());
        cursor = span.old.end;
    }
    out.extend(old.get(cursor..)?.iter().copied());
    Some(out)
}

/// Lines added and removed by a set of spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub additions: u32,
    pub deletions: u32,
}

impl DiffStats {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.additions == 0 && self.deletions == 0
    }
}

/// Compute diff stats (additions and deletions) for `spans`.
#[must_use]
pub fn diff_stats(spans: &[DiffSpan]) -> DiffStats {
    spans.iter().fold(DiffStats::default(), |mut stats, span| {
        stats.additions = stats.additions.saturating_add(span.new.len() as u32);
        stats.deletions = stats.deletions.saturating_add(span.old.len() as u32);
        stats
    })
}
