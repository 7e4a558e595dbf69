//! Line-granularity diffing and diff rendering.
//!
//! [`lcs::compute_diff`] turns two texts into an [`EditScript`](qcos_core::EditScript)
//! using a longest-common-subsequence table. The [`render`] module groups a
//! script into hunks and prints it as marker lines, Markdown, or a unified patch.

pub mod lcs;
pub mod render;

pub use lcs::{compute_diff, compute_diff_lines, split_lines};
