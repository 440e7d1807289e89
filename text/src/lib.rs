//! Text primitives shared by the reweave crates.
//!
//! - **`line_index`**: offset <-> (line, column) mapping over one text snapshot
//! - **`diff`**: line-granular diffing backed by `similar`, plus diff stats

pub mod diff;
pub mod line_index;

mod error;

pub use diff::{
    DiffAlgorithm, DiffKind, DiffSpan, DiffStats, LineDiffer, SimilarDiffer, diff_lines,
    diff_stats,
};
pub use error::TextError;
pub use line_index::{LineEnding, LineIndex, check_offset};
