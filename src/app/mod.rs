//! Run orchestration: setup, staged load, drain, and the final report.
mod orchestrator;
mod report;
mod setup;


pub use orchestrator::Orchestrator;
pub use report::{MetricSummary, RunOutcome, RunReport};
pub use setup::{LoginRequest, Setup, SetupData, TokenSetup, TokenSource};
