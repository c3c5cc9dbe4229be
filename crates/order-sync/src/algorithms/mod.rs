//! Algorithms module for Order Sync
//!
//! Contains:
//! - Source → destination transform
//! - Reconciliation diff (summary and itemized report)

pub mod reconcile;
pub mod transform;

pub use reconcile::{itemize, summarize};
pub use transform::to_submission;
