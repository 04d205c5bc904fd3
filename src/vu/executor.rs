use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use crate::metrics::{Sample, builtin};
use crate::scenario::Workflow;

use super::context::{RunContext, VuContext, duration_ms};

/// One virtual user: repeats the workflow until told to stop.
pub struct VirtualUser {
    ctx: VuContext,
    workflow: Arc<dyn Workflow>,
}

impl VirtualUser {
    #[must_use]
    pub fn new(id: u64, run: Arc<RunContext>, workflow: Arc<dyn Workflow>) -> Self {
        Self {
            ctx: VuContext::new(id, run),
            workflow,
        }
    }

    /// Runs iterations until `stop_rx` reads `true`. The flag is only
    /// observed between iterations, so a started iteration always reports all
    /// of its outcomes. Returns the number of completed iterations.
    pub async fn run(self, stop_rx: watch::Receiver<bool>) -> u64 {
        let id = self.ctx.id();
        debug!("VU {} started", id);
        let mut iterations: u64 = 0;
        loop {
            if *stop_rx.borrow() {
                break;
            }
            let started = Instant::now();
            self.workflow.run_iteration(&self.ctx).await;
            let tags = self.ctx.scenario_tags();
            let metrics = self.ctx.metrics();
            metrics.record(&Sample::counter(builtin::ITERATIONS, 1.0, tags.clone()));
            metrics.record(&Sample::trend(
                builtin::ITERATION_DURATION,
                duration_ms(started.elapsed()),
                tags,
            ));
            iterations = iterations.saturating_add(1);
            tokio::task::yield_now().await;
        }
        debug!("VU {} stopped after {} iterations", id, iterations);
        iterations
    }
}
