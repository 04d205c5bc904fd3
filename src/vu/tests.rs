use super::*;
use crate::app::SetupData;
use crate::http::{HttpMethod, MockRoleApi, Transport};
use crate::metrics::{MetricsAggregator, builtin};
use crate::scenario::Workflow;
use crate::scheduler::Population;
use crate::shutdown::{StopKind, shutdown_channel};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, sleep};

fn millis(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Sleeps for a fixed time per iteration and counts iterations per user.
struct NapWorkflow {
    iteration: Duration,
    per_user: Mutex<BTreeMap<u64, u64>>,
}

impl NapWorkflow {
    fn new(iteration: Duration) -> Self {
        Self {
            iteration,
            per_user: Mutex::new(BTreeMap::new()),
        }
    }

    fn iterations_of(&self, id: u64) -> u64 {
        self.per_user.lock().get(&id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Workflow for NapWorkflow {
    fn name(&self) -> &'static str {
        "nap"
    }

    fn steps(&self) -> Vec<&'static str> {
        vec!["nap"]
    }

    async fn run_iteration(&self, ctx: &VuContext) {
        {
            let mut per_user = self.per_user.lock();
            let count = per_user.entry(ctx.id()).or_insert(0);
            *count = count.saturating_add(1);
        }
        sleep(self.iteration).await;
    }
}

fn run_context(transport: Arc<dyn Transport>, token: &str) -> (Arc<RunContext>, Arc<MetricsAggregator>) {
    let metrics = Arc::new(MetricsAggregator::default());
    let run = Arc::new(RunContext {
        base_url: "http://roles.test/".to_owned(),
        transport,
        metrics: Arc::clone(&metrics),
        setup: SetupData {
            token: token.to_owned(),
        },
        headers: vec![("X-Trace".to_owned(), "on".to_owned())],
        pause: Duration::ZERO,
        scenario: "roles",
    });
    (run, metrics)
}

fn pool_with(workflow: &Arc<NapWorkflow>, ramp_down: Duration) -> (VuPool, Arc<MetricsAggregator>) {
    let transport: Arc<dyn Transport> = Arc::new(MockRoleApi::new(Duration::ZERO));
    let (run, metrics) = run_context(transport, "");
    let workflow: Arc<dyn Workflow> = Arc::<NapWorkflow>::clone(workflow);
    (VuPool::new(run, workflow, ramp_down), metrics)
}

#[tokio::test(start_paused = true)]
async fn request_records_tagged_metrics_and_sends_auth() -> Result<(), String> {
    let api = Arc::new(MockRoleApi::new(millis(20)));
    let transport: Arc<dyn Transport> = Arc::<MockRoleApi>::clone(&api);
    let (run, metrics) = run_context(transport, "secret");
    let ctx = VuContext::new(7, run);

    let response = ctx.request("list", HttpMethod::Get, "/api/roles", None).await;
    if response.status != 200 {
        return Err(format!("Expected 200, got {}", response.status));
    }
    let exchanges = api.exchanges();
    let sent = exchanges.first().ok_or("No exchange recorded")?;
    if sent.authorization.as_deref() != Some("Bearer secret") {
        return Err(format!("Unexpected authorization {:?}", sent.authorization));
    }

    let reqs = metrics.snapshot_named(builtin::HTTP_REQS);
    if reqs.value() != Some(1.0) {
        return Err(format!("Expected one request, got {:?}", reqs.value()));
    }
    let duration = metrics.snapshot_named(builtin::HTTP_REQ_DURATION);
    if duration.max.is_none_or(|max| max < 19.0) {
        return Err(format!("Expected ~20ms duration, got {:?}", duration.max));
    }
    if metrics.snapshot_named(builtin::HTTP_REQ_FAILED).error_rate() > 0.0 {
        return Err("Expected no failed requests".to_owned());
    }
    if metrics.snapshot_named(builtin::DATA_RECEIVED).value().is_none_or(|bytes| bytes < 1.0) {
        return Err("Expected received bytes to be counted".to_owned());
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn empty_token_sends_no_authorization() -> Result<(), String> {
    let api = Arc::new(MockRoleApi::new(millis(1)));
    let transport: Arc<dyn Transport> = Arc::<MockRoleApi>::clone(&api);
    let (run, _metrics) = run_context(transport, "");
    VuContext::new(1, run)
        .request("list", HttpMethod::Get, "/api/roles", None)
        .await;
    if api.exchanges().iter().any(|exchange| exchange.authorization.is_some()) {
        return Err("Expected no Authorization header".to_owned());
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn virtual_user_stops_between_iterations() -> Result<(), String> {
    let workflow = Arc::new(NapWorkflow::new(millis(100)));
    let transport: Arc<dyn Transport> = Arc::new(MockRoleApi::new(Duration::ZERO));
    let (run, metrics) = run_context(transport, "");
    let user = VirtualUser::new(1, run, Arc::<NapWorkflow>::clone(&workflow));
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(user.run(stop_rx));

    sleep(millis(250)).await;
    stop_tx
        .send(true)
        .map_err(|err| format!("stop send failed: {}", err))?;
    let started = Instant::now();
    let iterations = task
        .await
        .map_err(|err| format!("VU task failed: {}", err))?;

    if iterations != 3 {
        return Err(format!("Expected 3 iterations, got {}", iterations));
    }
    if started.elapsed() > millis(60) {
        return Err("Expected the in-flight iteration to finish, not a new one".to_owned());
    }
    let recorded = metrics.snapshot_named(builtin::ITERATIONS).value();
    if recorded != Some(3.0) {
        return Err(format!("Expected 3 recorded iterations, got {:?}", recorded));
    }
    if metrics.snapshot_named(builtin::ITERATION_DURATION).count != 3 {
        return Err("Expected one iteration_duration sample per iteration".to_owned());
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn retire_picks_most_recent_users() -> Result<(), String> {
    let workflow = Arc::new(NapWorkflow::new(millis(100)));
    let (mut pool, _metrics) = pool_with(&workflow, millis(1000));
    pool.spawn(3);
    sleep(millis(50)).await;
    pool.retire(1);
    if pool.live() != 2 || pool.running() != 3 {
        return Err(format!(
            "Expected 2 live / 3 running, got {} / {}",
            pool.live(),
            pool.running()
        ));
    }

    sleep(millis(500)).await;
    pool.reap();
    let retired_before = workflow.iterations_of(3);
    let kept_before = workflow.iterations_of(1);
    sleep(millis(500)).await;

    if workflow.iterations_of(3) != retired_before {
        return Err("Retired VU 3 kept iterating".to_owned());
    }
    if workflow.iterations_of(1) <= kept_before {
        return Err("VU 1 should still be iterating".to_owned());
    }
    let stats = pool.stats();
    if stats.spawned != 3 || stats.completed != 1 || stats.peak != 3 || pool.running() != 2 {
        return Err(format!("Unexpected stats {:?}", stats));
    }
    pool.abort_all();
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn ramp_down_budget_aborts_slow_iterations() -> Result<(), String> {
    let workflow = Arc::new(NapWorkflow::new(Duration::from_secs(10)));
    let (mut pool, _metrics) = pool_with(&workflow, Duration::from_secs(1));
    pool.spawn(1);
    sleep(millis(10)).await;
    pool.retire(1);
    sleep(millis(500)).await;
    pool.reap();
    if pool.running() != 1 {
        return Err("Retiring VU should still be within its budget".to_owned());
    }
    sleep(Duration::from_secs(1)).await;
    pool.reap();
    let stats = pool.stats();
    if pool.running() != 0 || stats.aborted != 1 || stats.completed != 0 {
        return Err(format!("Expected one aborted VU, got {:?}", stats));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn drain_waits_for_current_iterations() -> Result<(), String> {
    let workflow = Arc::new(NapWorkflow::new(millis(200)));
    let (mut pool, _metrics) = pool_with(&workflow, Duration::from_secs(1));
    let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
    pool.spawn(2);
    sleep(millis(50)).await;

    let started = Instant::now();
    let finished = pool.drain(Duration::from_secs(5), &mut shutdown_rx).await;
    if !finished {
        return Err("Expected every VU to finish on its own".to_owned());
    }
    if started.elapsed() > millis(200) {
        return Err(format!("Drain took {:?}", started.elapsed()));
    }
    let stats = pool.stats();
    if stats.completed != 2 || stats.aborted != 0 || pool.running() != 0 {
        return Err(format!("Unexpected stats {:?}", stats));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn drain_aborts_after_graceful_stop() -> Result<(), String> {
    let workflow = Arc::new(NapWorkflow::new(Duration::from_secs(60)));
    let (mut pool, _metrics) = pool_with(&workflow, Duration::from_secs(1));
    let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
    pool.spawn(2);
    sleep(millis(10)).await;

    let started = Instant::now();
    if pool.drain(Duration::from_secs(2), &mut shutdown_rx).await {
        return Err("Expected the graceful stop budget to run out".to_owned());
    }
    if started.elapsed() < Duration::from_secs(2) || started.elapsed() > Duration::from_secs(3) {
        return Err(format!("Unexpected drain time {:?}", started.elapsed()));
    }
    if pool.stats().aborted != 2 {
        return Err(format!("Expected 2 aborted VUs, got {:?}", pool.stats()));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn hard_stop_cuts_drain_short() -> Result<(), String> {
    let workflow = Arc::new(NapWorkflow::new(Duration::from_secs(60)));
    let (mut pool, _metrics) = pool_with(&workflow, Duration::from_secs(1));
    let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
    pool.spawn(1);
    sleep(millis(10)).await;

    tokio::spawn(async move {
        sleep(Duration::from_secs(1)).await;
        drop(shutdown_tx.send(StopKind::Graceful));
        drop(shutdown_tx.send(StopKind::Hard));
    });
    let started = Instant::now();
    if pool.drain(Duration::from_secs(30), &mut shutdown_rx).await {
        return Err("Expected the hard stop to interrupt the drain".to_owned());
    }
    if started.elapsed() > Duration::from_secs(2) {
        return Err(format!("Hard stop was not honoured: {:?}", started.elapsed()));
    }
    if pool.stats().aborted != 1 {
        return Err(format!("Expected 1 aborted VU, got {:?}", pool.stats()));
    }
    Ok(())
}
