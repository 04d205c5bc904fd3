//! Stage profile math and the tick-driven concurrency controller.
mod controller;
mod profile;

#[cfg(test)]
mod tests;

pub use controller::{Population, ScheduleDecision, SchedulerExit, StageScheduler};
pub use profile::{ProfilePhase, Stage, StageProfile};
