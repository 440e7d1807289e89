//! Public types consumed by callers of the assembler.
//!
//! Callers build [`AssembleOptions`], hand [`crate::FileRewrite`]s to the
//! [`crate::WorkspaceEditAssembler`], and read back an [`AssembledEdit`]: the
//! change set to send to the client plus the per-file [`FileProblem`]s and
//! [`FileReport`]s for logging and UI.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use reweave_text::{DiffAlgorithm, DiffStats, TextError};
use reweave_types::{ChangeAnnotation, PositionEncoding, WorkspaceEditSet};

/// Errors raised while turning rewrites into edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error(transparent)]
    OutOfRange(#[from] TextError),
    #[error("edits {first:?} and {second:?} overlap")]
    OverlappingEdits {
        first: Range<usize>,
        second: Range<usize>,
    },
    #[error("source of {uri} unavailable: {reason}")]
    SourceUnavailable { uri: String, reason: String },
    #[error("{uri} does not name a file on disk")]
    IdentityMismatch { uri: String },
    #[error("{uri} changed underneath the edits (expected version {expected:?}, found {actual:?})")]
    StaleSnapshot {
        uri: String,
        expected: Option<i32>,
        actual: Option<i32>,
    },
    #[error("{uri} is not open")]
    NotOpen { uri: String },
    #[error("rewrite recipe {recipe} failed: {message}")]
    Rewrite { recipe: String, message: String },
    #[error("worker for {uri} failed: {message}")]
    Worker { uri: String, message: String },
    #[error("workspace edit computation cancelled")]
    Cancelled,
}

/// A file whose change was abandoned. Other files in the batch still proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProblem {
    pub uri: String,
    pub error: EditError,
}

/// Where the "before" text of an update came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ContentSource {
    /// Open editor buffer from the snapshot registry.
    LiveSnapshot { version: i32 },
    /// Inline text handed over by the rewrite engine.
    Supplied,
    /// Read through the source loader.
    Loaded,
    /// File did not exist before.
    Created,
    /// File does not exist after.
    Deleted,
}

/// Per-file summary of one assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub uri: String,
    pub source: ContentSource,
    pub spans: usize,
    pub dropped_spans: usize,
    pub stats: DiffStats,
}

/// Result of assembling one batch of rewrites.
#[derive(Debug, Clone, Default)]
pub struct AssembledEdit {
    pub edit: WorkspaceEditSet,
    pub problems: Vec<FileProblem>,
    pub reports: Vec<FileReport>,
}

impl AssembledEdit {
    /// Whether at least one file was abandoned.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.problems.is_empty()
    }

    /// Diff spans that could not be projected, across all files.
    #[must_use]
    pub fn dropped_spans(&self) -> usize {
        self.reports.iter().map(|report| report.dropped_spans).sum()
    }
}

/// How an `Update` expresses its edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditMode {
    /// One edit per changed line region.
    #[default]
    Diff,
    /// One edit replacing the whole original document.
    WholeDocument,
}

/// Knobs for [`crate::WorkspaceEditAssembler`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembleOptions {
    pub algorithm: DiffAlgorithm,
    pub encoding: PositionEncoding,
    pub mode: EditMode,
    /// Annotation id stamped on every edit, and the annotation it refers to.
    pub annotation: Option<(String, ChangeAnnotation)>,
}

impl AssembleOptions {
    #[must_use]
    pub fn annotation_id(&self) -> Option<&str> {
        self.annotation.as_ref().map(|(id, _)| id.as_str())
    }
}
