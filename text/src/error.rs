use thiserror::Error;

/// A line or offset reference fell outside the addressed text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("line {line} out of range (text has {line_count} lines)")]
    LineOutOfRange { line: usize, line_count: usize },
    #[error("offset {offset} out of range (text length {len})")]
    OffsetOutOfRange { offset: usize, len: usize },
    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },
    #[error("range {start}..{end} ends before it starts")]
    InvertedRange { start: usize, end: usize },
}
