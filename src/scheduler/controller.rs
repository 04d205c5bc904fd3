use std::ops::ControlFlow;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};
use tracing::{debug, info, warn};

use crate::shutdown::{ShutdownReceiver, StopKind, recv_stop};

use super::{ProfilePhase, StageProfile};

/// Ticks faster than this would only burn CPU.
const MIN_TICK: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDecision {
    Spawn(u64),
    Retire(u64),
    Hold,
}

impl ScheduleDecision {
    #[must_use]
    pub const fn between(live: u64, target: u64) -> Self {
        if target > live {
            ScheduleDecision::Spawn(target.saturating_sub(live))
        } else if live > target {
            ScheduleDecision::Retire(live.saturating_sub(target))
        } else {
            ScheduleDecision::Hold
        }
    }
}

/// The set of virtual users the scheduler steers.
pub trait Population {
    /// Users that are running and have not been asked to retire.
    fn live(&self) -> u64;
    fn spawn(&mut self, count: u64);
    fn retire(&mut self, count: u64);
    /// Housekeeping before each decision: release finished users and enforce
    /// ramp-down deadlines.
    fn reap(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerExit {
    /// The profile ran to its end.
    Completed,
    /// A stop request arrived before the end.
    Interrupted(StopKind),
    /// The tick hook asked to stop.
    Aborted,
}

#[derive(Debug, Clone)]
pub struct StageScheduler {
    profile: StageProfile,
    tick: Duration,
}

impl StageScheduler {
    #[must_use]
    pub fn new(profile: StageProfile, tick: Duration) -> Self {
        Self {
            profile,
            tick: tick.max(MIN_TICK),
        }
    }

    #[must_use]
    pub const fn profile(&self) -> &StageProfile {
        &self.profile
    }

    #[must_use]
    pub const fn tick(&self) -> Duration {
        self.tick
    }

    #[must_use]
    pub fn decide(&self, elapsed: Duration, live: u64, phase: ProfilePhase) -> ScheduleDecision {
        ScheduleDecision::between(live, self.profile.target_at(elapsed, phase))
    }

    /// Brings `population` in line with the target at `elapsed`.
    pub fn apply<P>(&self, population: &mut P, elapsed: Duration, phase: ProfilePhase) -> ScheduleDecision
    where
        P: Population + ?Sized,
    {
        population.reap();
        let decision = self.decide(elapsed, population.live(), phase);
        match decision {
            ScheduleDecision::Spawn(count) => {
                debug!("Spawning {} VUs at {:?}", count, elapsed);
                population.spawn(count);
            }
            ScheduleDecision::Retire(count) => {
                debug!("Retiring {} VUs at {:?}", count, elapsed);
                population.retire(count);
            }
            ScheduleDecision::Hold => {}
        }
        decision
    }

    /// Drives `population` along the profile until it ends, a stop request
    /// arrives, or `on_tick` breaks. `on_tick` runs after every adjustment.
    pub async fn run<P, F>(
        &self,
        population: &mut P,
        shutdown_rx: &mut ShutdownReceiver,
        mut on_tick: F,
    ) -> SchedulerExit
    where
        P: Population + ?Sized,
        F: FnMut(Duration, &P) -> ControlFlow<()>,
    {
        let started = Instant::now();
        let total = self.profile.total_duration();
        let deadline = started.checked_add(total);
        let stage_count = self.profile.stages().len();
        info!(
            "Running {} stages over {:?} (peak {} VUs, tick {:?}).",
            stage_count,
            total,
            self.profile.max_target(),
            self.tick
        );

        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut current_stage = None;

        loop {
            tokio::select! {
                biased;
                kind = recv_stop(shutdown_rx) => {
                    info!("Stop requested ({:?}) at {:?}.", kind, started.elapsed());
                    return SchedulerExit::Interrupted(kind);
                }
                () = async {
                    match deadline {
                        Some(deadline) => sleep_until(deadline).await,
                        None => std::future::pending::<()>().await,
                    }
                } => {
                    info!("Stage profile complete after {:?}.", total);
                    return SchedulerExit::Completed;
                }
                _ = ticker.tick() => {
                    let elapsed = started.elapsed();
                    let stage = self.profile.stage_index(elapsed);
                    if stage != current_stage {
                        if let Some(idx) = stage
                            && let Some(spec) = self.profile.stages().get(idx)
                        {
                            info!(
                                "Stage {}/{}: {} to {} VUs over {:?}.",
                                idx.saturating_add(1),
                                stage_count,
                                if spec.hold { "hold" } else { "ramp" },
                                spec.target,
                                spec.duration
                            );
                        }
                        current_stage = stage;
                    }
                    self.apply(population, elapsed, ProfilePhase::Running);
                    if on_tick(elapsed, &*population).is_break() {
                        warn!("Run aborted at {:?}.", elapsed);
                        return SchedulerExit::Aborted;
                    }
                }
            }
        }
    }
}
