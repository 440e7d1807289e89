//! Protocol data model for reweave.
//!
//! This crate contains the pure types that cross the editor protocol boundary:
//! positions, ranges, text edits, document identities and the multi-file
//! [`WorkspaceEditSet`]. No IO, no async. The serde shapes match the Language
//! Server Protocol field for field so a set can be handed to a client as-is.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod change;
mod text;

pub use change::{ChangeAnnotation, FileChange, WorkspaceEditSet};
pub use text::PositionEncoding;

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Positions and Ranges
// ============================================================================

/// A zero-based line/column position.
///
/// The unit of `character` is decided by the [`PositionEncoding`] in use at the
/// boundary where the position was produced. Ordering is lexicographic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    #[must_use]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// The first position of any document.
    #[must_use]
    pub const fn origin() -> Self {
        Self::new(0, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

/// A half-open range between two positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Build a range, swapping the ends if they arrive reversed.
    #[must_use]
    pub fn new(start: Position, end: Position) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// A zero-width range at `position`.
    #[must_use]
    pub const fn point(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

// ============================================================================
// Text Edits
// ============================================================================

/// Replace the text covered by `range` with `new_text`.
///
/// An empty `new_text` is a deletion, an empty `range` is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_id: Option<String>,
}

impl TextEdit {
    #[must_use]
    pub fn new(range: Range, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
            annotation_id: None,
        }
    }

    #[must_use]
    pub fn insert(position: Position, new_text: impl Into<String>) -> Self {
        Self::new(Range::point(position), new_text)
    }

    #[must_use]
    pub fn delete(range: Range) -> Self {
        Self::new(range, String::new())
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation_id: Option<String>) -> Self {
        self.annotation_id = annotation_id;
        self
    }

    #[must_use]
    pub fn is_insertion(&self) -> bool {
        self.range.is_empty()
    }

    #[must_use]
    pub fn is_deletion(&self) -> bool {
        self.new_text.is_empty() && !self.range.is_empty()
    }
}

// ============================================================================
// Document Identity
// ============================================================================

/// Identifies a document and, when an editor has it open, its version.
///
/// A version of `None` or `0` means the document is not open in an editor and
/// whatever content the caller supplied is the ground truth. On the wire the
/// version is always present and may be `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentIdentity {
    pub uri: String,
    #[serde(default)]
    pub version: Option<i32>,
}

impl DocumentIdentity {
    #[must_use]
    pub fn new(uri: impl Into<String>, version: Option<i32>) -> Self {
        Self {
            uri: uri.into(),
            version,
        }
    }

    /// Identity for a document no editor has opened.
    #[must_use]
    pub fn unversioned(uri: impl Into<String>) -> Self {
        Self::new(uri, None)
    }

    /// Whether an editor owns this document (version present and positive).
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.version.is_some_and(|v| v > 0)
    }
}
