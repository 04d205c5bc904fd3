use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::RunConfig;
use crate::error::AppResult;
use crate::http::Transport;
use crate::metrics::{MetricKey, MetricsAggregator, Sample, Tags, builtin};
use crate::scenario::{RoleWorkflow, Workflow};
use crate::scheduler::{SchedulerExit, StageScheduler};
use crate::shutdown::{ShutdownReceiver, StopKind};
use crate::thresholds::{ThresholdResult, evaluate, first_abort_failure};
use crate::vu::{RunContext, STEP_TAG, VuPool};

use super::report::{MetricSummary, RunOutcome, RunReport};
use super::setup::{Setup, TokenSetup};

/// Per-step sub-metrics registered for every workflow step.
const STEP_METRICS: [&str; 2] = [builtin::HTTP_REQS, builtin::HTTP_REQ_DURATION];

/// Runs one load test: setup, staged load, drain, threshold evaluation.
pub struct Orchestrator {
    config: RunConfig,
    transport: Arc<dyn Transport>,
    workflow: Arc<dyn Workflow>,
    setup: Arc<dyn Setup>,
}

impl Orchestrator {
    /// Uses the role workflow and token setup derived from `config`.
    #[must_use]
    pub fn new(config: RunConfig, transport: Arc<dyn Transport>) -> Self {
        let setup = TokenSetup::new(config.token.clone(), Arc::clone(&transport));
        Self {
            config,
            transport,
            workflow: Arc::new(RoleWorkflow::new()),
            setup: Arc::new(setup),
        }
    }

    #[must_use]
    pub fn with_workflow(mut self, workflow: Arc<dyn Workflow>) -> Self {
        self.workflow = workflow;
        self
    }

    #[must_use]
    pub fn with_setup(mut self, setup: Arc<dyn Setup>) -> Self {
        self.setup = setup;
        self
    }

    fn build_metrics(&self) -> MetricsAggregator {
        let mut metrics = MetricsAggregator::default();
        for threshold in &self.config.thresholds {
            metrics.track(threshold.metric.clone());
        }
        for step in self.workflow.steps() {
            for metric in STEP_METRICS {
                metrics.track(MetricKey::named(metric).with_tag(STEP_TAG, step));
            }
        }
        metrics
    }

    /// Executes the run and returns its report.
    ///
    /// # Errors
    ///
    /// Returns an error when setup fails; no load is generated in that case.
    /// A completed run always returns `Ok`, even when thresholds fail.
    pub async fn run(&self, mut shutdown_rx: ShutdownReceiver) -> AppResult<RunReport> {
        let setup = match self.setup.run().await {
            Ok(setup) => setup,
            Err(err) => {
                error!("Setup failed: {}", err);
                return Err(err.into());
            }
        };

        let metrics = Arc::new(self.build_metrics());
        let run = Arc::new(RunContext {
            base_url: self.config.base_url.clone(),
            transport: Arc::clone(&self.transport),
            metrics: Arc::clone(&metrics),
            setup,
            headers: self.config.headers.clone(),
            pause: self.config.pause,
            scenario: self.workflow.name(),
        });
        let mut pool = VuPool::new(
            run,
            Arc::clone(&self.workflow),
            self.config.graceful_ramp_down,
        );
        let scheduler = StageScheduler::new(self.config.profile.clone(), self.config.tick_interval);
        let thresholds = &self.config.thresholds;

        info!(
            "Starting '{}' against {}.",
            self.workflow.name(),
            self.config.base_url
        );
        let started_at = chrono::Utc::now();
        let started = Instant::now();
        let mut abort_failure: Option<ThresholdResult> = None;

        let exit = scheduler
            .run(&mut pool, &mut shutdown_rx, |elapsed, population| {
                record_vus(&metrics, population.running(), population.stats().peak);
                match first_abort_failure(thresholds, &metrics, elapsed) {
                    Some(failure) => {
                        abort_failure = Some(failure);
                        ControlFlow::Break(())
                    }
                    None => ControlFlow::Continue(()),
                }
            })
            .await;

        let outcome = match exit {
            SchedulerExit::Completed => {
                pool.drain(self.config.graceful_stop, &mut shutdown_rx).await;
                RunOutcome::Completed
            }
            SchedulerExit::Interrupted(StopKind::Graceful) => {
                pool.drain(self.config.graceful_stop, &mut shutdown_rx).await;
                RunOutcome::Interrupted
            }
            SchedulerExit::Interrupted(StopKind::Hard) => {
                pool.abort_all();
                RunOutcome::HardStopped
            }
            SchedulerExit::Aborted => {
                pool.abort_all();
                match abort_failure {
                    Some(failure) => {
                        warn!(
                            "Threshold {} {} failed (observed {:?}); run aborted.",
                            failure.metric, failure.expression, failure.observed
                        );
                        RunOutcome::AbortedByThreshold {
                            metric: failure.metric,
                            expression: failure.expression,
                        }
                    }
                    None => RunOutcome::Interrupted,
                }
            }
        };
        record_vus(&metrics, 0, pool.stats().peak);

        let threshold_report = evaluate(thresholds, &metrics);
        let passed = threshold_report.passed
            && !matches!(outcome, RunOutcome::AbortedByThreshold { .. });
        let report = RunReport {
            started_at: started_at.to_rfc3339(),
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            outcome,
            passed,
            thresholds: threshold_report,
            checks: metrics.checks(),
            metrics: metrics
                .snapshot_all()
                .iter()
                .map(|(key, snapshot)| (key.clone(), MetricSummary::from_snapshot(snapshot)))
                .collect(),
            vus: pool.stats(),
        };
        info!(
            "Run {} in {}ms: {}.",
            report.outcome.describe(),
            report.duration_ms,
            if report.passed { "passed" } else { "failed" }
        );
        Ok(report)
    }
}

#[expect(clippy::cast_precision_loss, reason = "VU counts stay far below 2^52")]
fn record_vus(metrics: &MetricsAggregator, running: u64, peak: u64) {
    metrics.record(&Sample::gauge(builtin::VUS, running as f64, Tags::new()));
    metrics.record(&Sample::gauge(builtin::VUS_MAX, peak as f64, Tags::new()));
}
