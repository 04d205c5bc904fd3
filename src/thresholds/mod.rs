//! Threshold expressions and pass/fail evaluation against metric snapshots.
mod evaluate;
mod expr;


pub use evaluate::{ThresholdReport, ThresholdResult, evaluate, first_abort_failure};
pub use expr::{Aggregation, Comparator, Threshold, ThresholdExpr};
