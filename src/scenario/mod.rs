//! Scripted iteration workflows run by each virtual user.
mod payload;
pub mod roles;

#[cfg(test)]
mod tests;

use async_trait::async_trait;

use crate::vu::VuContext;

pub use payload::{random_string, role_payload};
pub use roles::RoleWorkflow;

/// One scripted pass a virtual user repeats until it is stopped.
#[async_trait]
pub trait Workflow: Send + Sync {
    fn name(&self) -> &'static str;

    /// Step names, used to register per-step sub-metrics before the run.
    fn steps(&self) -> Vec<&'static str>;

    /// Runs a single iteration. Outcomes are reported through `ctx`; nothing
    /// is returned because no failure inside an iteration is fatal.
    async fn run_iteration(&self, ctx: &VuContext);
}
