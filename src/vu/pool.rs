use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::scenario::Workflow;
use crate::scheduler::Population;
use crate::shutdown::{ShutdownReceiver, recv_hard_stop};

use super::{RunContext, VirtualUser};

struct VuHandle {
    id: u64,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

struct RetiringVu {
    handle: VuHandle,
    deadline: Option<Instant>,
}

/// Lifecycle counters for the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VuStats {
    pub spawned: u64,
    /// Users that finished their last iteration after being told to stop.
    pub completed: u64,
    /// Users cancelled mid-iteration (ramp-down budget, graceful stop budget or
    /// hard stop).
    pub aborted: u64,
    pub peak: u64,
}

/// The live virtual users of a run.
///
/// Retiring picks the most recently spawned users first. A retired user
/// keeps running until its current iteration ends, bounded by the ramp-down
/// budget.
pub struct VuPool {
    run: Arc<RunContext>,
    workflow: Arc<dyn Workflow>,
    active: Vec<VuHandle>,
    retiring: Vec<RetiringVu>,
    next_id: u64,
    ramp_down: Duration,
    stats: VuStats,
}

impl VuPool {
    #[must_use]
    pub fn new(run: Arc<RunContext>, workflow: Arc<dyn Workflow>, ramp_down: Duration) -> Self {
        Self {
            run,
            workflow,
            active: Vec::new(),
            retiring: Vec::new(),
            next_id: 1,
            ramp_down,
            stats: VuStats::default(),
        }
    }

    /// Active plus retiring users.
    #[must_use]
    pub fn running(&self) -> u64 {
        let total = self.active.len().saturating_add(self.retiring.len());
        u64::try_from(total).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub const fn stats(&self) -> VuStats {
        self.stats
    }

    fn begin_retire(&mut self, handle: VuHandle, budget: Duration) {
        handle.stop_tx.send(true).ok();
        let deadline = Instant::now().checked_add(budget);
        debug!("VU {} retiring", handle.id);
        self.retiring.push(RetiringVu { handle, deadline });
    }

    /// Asks every active user to stop after its current iteration, then waits
    /// up to `graceful_stop` (or until a hard stop) before aborting the rest.
    /// Returns `true` when every user finished on its own.
    pub async fn drain(&mut self, graceful_stop: Duration, shutdown_rx: &mut ShutdownReceiver) -> bool {
        let stopping = std::mem::take(&mut self.active);
        for handle in stopping {
            self.begin_retire(handle, graceful_stop);
        }
        let deadline = Instant::now().checked_add(graceful_stop);
        if !self.retiring.is_empty() {
            info!(
                "Waiting up to {:?} for {} VUs to finish their iteration.",
                graceful_stop,
                self.retiring.len()
            );
        }

        let finished = {
            let waits = join_all(self.retiring.iter_mut().map(|vu| &mut vu.handle.task));
            tokio::select! {
                _ = waits => true,
                () = recv_hard_stop(shutdown_rx) => false,
                () = async {
                    match deadline {
                        Some(deadline) => sleep_until(deadline).await,
                        None => std::future::pending::<()>().await,
                    }
                } => false,
            }
        };
        if !finished {
            warn!("Graceful stop interrupted; aborting remaining VUs.");
        }
        self.abort_all();
        finished
    }

    /// Cancels every user immediately. Users that already finished are
    /// counted as completed.
    pub fn abort_all(&mut self) {
        let active = std::mem::take(&mut self.active);
        let retiring = std::mem::take(&mut self.retiring);
        for handle in active
            .into_iter()
            .chain(retiring.into_iter().map(|vu| vu.handle))
        {
            if handle.task.is_finished() {
                self.stats.completed = self.stats.completed.saturating_add(1);
            } else {
                handle.task.abort();
                self.stats.aborted = self.stats.aborted.saturating_add(1);
            }
        }
    }
}

impl Population for VuPool {
    fn live(&self) -> u64 {
        u64::try_from(self.active.len()).unwrap_or(u64::MAX)
    }

    fn spawn(&mut self, count: u64) {
        for _ in 0..count {
            let id = self.next_id;
            self.next_id = self.next_id.saturating_add(1);
            let (stop_tx, stop_rx) = watch::channel(false);
            let user = VirtualUser::new(id, Arc::clone(&self.run), Arc::clone(&self.workflow));
            let task = tokio::spawn(async move {
                user.run(stop_rx).await;
            });
            self.active.push(VuHandle { id, stop_tx, task });
            self.stats.spawned = self.stats.spawned.saturating_add(1);
        }
        self.stats.peak = self.stats.peak.max(self.running());
    }

    fn retire(&mut self, count: u64) {
        for _ in 0..count {
            let Some(handle) = self.active.pop() else {
                break;
            };
            self.begin_retire(handle, self.ramp_down);
        }
    }

    fn reap(&mut self) {
        let now = Instant::now();
        let stats = &mut self.stats;
        self.retiring.retain(|vu| {
            if vu.handle.task.is_finished() {
                stats.completed = stats.completed.saturating_add(1);
                return false;
            }
            if vu.deadline.is_some_and(|deadline| now >= deadline) {
                warn!("VU {} exceeded the ramp-down budget; aborting.", vu.handle.id);
                vu.handle.task.abort();
                stats.aborted = stats.aborted.saturating_add(1);
                return false;
            }
            true
        });
        self.active.retain(|handle| {
            if handle.task.is_finished() {
                warn!("VU {} exited unexpectedly.", handle.id);
                stats.completed = stats.completed.saturating_add(1);
                return false;
            }
            true
        });
    }
}

impl Drop for VuPool {
    fn drop(&mut self) {
        for handle in &self.active {
            handle.task.abort();
        }
        for vu in &self.retiring {
            vu.handle.task.abort();
        }
    }
}
