//! Turns whole-file rewrites into LSP workspace edits.
//!
//! - **`projector`**: line diff spans to byte-offset edits
//! - **`document_edits`**: per-document edit accumulation and rendering
//! - **`registry`**: live document snapshots
//! - **`assembler`**: multi-file assembly with per-file failure isolation
//! - **`protocol`**: `WorkspaceEdit` / `workspace/applyEdit` JSON shapes

pub mod document_edits;
pub mod projector;
pub mod protocol;
pub mod registry;
pub mod rewrite;
pub mod types;
pub mod uri;

mod assembler;

pub use assembler::WorkspaceEditAssembler;
pub use document_edits::DocumentEdits;
pub use projector::{DroppedSpan, EditProjector, ProjectedEdit, Projection};
pub use registry::{DocumentRegistry, DocumentSnapshot, SnapshotRegistry};
pub use rewrite::{FileRewrite, RewriteEngine, RewriteRequest, SourceLoader, SourceText};
pub use types::{
    AssembleOptions, AssembledEdit, ContentSource, EditError, EditMode, FileProblem, FileReport,
};
