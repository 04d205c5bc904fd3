use super::*;
use crate::shutdown::{StopKind, shutdown_channel};
use std::ops::ControlFlow;
use std::time::Duration;

fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

fn default_profile() -> StageProfile {
    StageProfile::new(
        0,
        vec![
            Stage::ramp(secs(30), 20),
            Stage::ramp(secs(60), 20),
            Stage::ramp(secs(30), 0),
        ],
    )
}

#[derive(Default)]
struct FakePopulation {
    live: u64,
    peak: u64,
    spawned: u64,
    retired: u64,
    reaps: u64,
}

impl Population for FakePopulation {
    fn live(&self) -> u64 {
        self.live
    }

    fn spawn(&mut self, count: u64) {
        self.live = self.live.saturating_add(count);
        self.spawned = self.spawned.saturating_add(count);
        self.peak = self.peak.max(self.live);
    }

    fn retire(&mut self, count: u64) {
        self.live = self.live.saturating_sub(count);
        self.retired = self.retired.saturating_add(count);
    }

    fn reap(&mut self) {
        self.reaps = self.reaps.saturating_add(1);
    }
}

#[test]
fn default_profile_ramps_holds_and_drains() -> Result<(), String> {
    let profile = default_profile();
    let expected = [
        (0, 0),
        (15, 10),
        (30, 20),
        (60, 20),
        (90, 20),
        (105, 10),
        (120, 0),
        (500, 0),
    ];
    for (at, target) in expected {
        let got = profile.target_concurrency(secs(at));
        if got != target {
            return Err(format!("At {}s expected {}, got {}", at, target, got));
        }
    }
    if profile.total_duration() != secs(120) {
        return Err("Expected 120s total duration".to_owned());
    }
    if profile.max_target() != 20 {
        return Err("Expected peak of 20".to_owned());
    }
    Ok(())
}

#[test]
fn steady_state_after_profile_depends_on_phase() -> Result<(), String> {
    let profile = StageProfile::new(0, vec![Stage::ramp(secs(10), 5)]);
    if profile.target_at(secs(60), ProfilePhase::Running) != 5 {
        return Err("Expected last target while running".to_owned());
    }
    if profile.target_at(secs(60), ProfilePhase::ShuttingDown) != 0 {
        return Err("Expected zero while shutting down".to_owned());
    }
    if profile.target_at(secs(5), ProfilePhase::ShuttingDown) != 0 {
        return Err("Expected zero mid-profile while shutting down".to_owned());
    }
    Ok(())
}

#[test]
fn interpolation_rounds_half_away_from_zero() -> Result<(), String> {
    let up = StageProfile::new(0, vec![Stage::ramp(secs(2), 1)]);
    if up.target_concurrency(secs(1)) != 1 {
        return Err("Expected 0.5 to round up".to_owned());
    }
    if up.target_concurrency(Duration::from_millis(999)) != 0 {
        return Err("Expected 0.4995 to round down".to_owned());
    }
    let down = StageProfile::new(1, vec![Stage::ramp(secs(2), 0)]);
    if down.target_concurrency(secs(1)) != 1 {
        return Err("Expected 0.5 on a ramp down to round away from zero".to_owned());
    }
    Ok(())
}

#[test]
fn ramp_boundaries_are_continuous() -> Result<(), String> {
    let profile = StageProfile::new(
        3,
        vec![
            Stage::ramp(secs(10), 40),
            Stage::ramp(secs(7), 11),
            Stage::ramp(secs(13), 0),
        ],
    );
    for boundary in [secs(10), secs(17), secs(30)] {
        let before = profile.target_concurrency(boundary.saturating_sub(Duration::from_nanos(1)));
        let at = profile.target_concurrency(boundary);
        if before.abs_diff(at) > 1 {
            return Err(format!(
                "Discontinuity at {:?}: {} then {}",
                boundary, before, at
            ));
        }
    }
    Ok(())
}

#[test]
fn start_vus_seed_the_first_ramp() -> Result<(), String> {
    let profile = StageProfile::new(5, vec![Stage::ramp(secs(10), 15)]);
    if profile.target_concurrency(Duration::ZERO) != 5 {
        return Err("Expected start concurrency at t=0".to_owned());
    }
    if profile.target_concurrency(secs(5)) != 10 {
        return Err("Expected midpoint between start and target".to_owned());
    }
    Ok(())
}

#[test]
fn zero_duration_stage_jumps() -> Result<(), String> {
    let profile = StageProfile::new(0, vec![Stage::ramp(Duration::ZERO, 10), Stage::ramp(secs(10), 10)]);
    if profile.target_concurrency(Duration::ZERO) != 10 {
        return Err("Expected an instantaneous jump".to_owned());
    }
    if profile.stage_index(Duration::ZERO) != Some(1) {
        return Err("Zero-length stage must never be active".to_owned());
    }
    Ok(())
}

#[test]
fn hold_stage_steps_immediately() -> Result<(), String> {
    let profile = StageProfile::new(0, vec![Stage::hold(secs(10), 7), Stage::ramp(secs(10), 0)]);
    if profile.target_concurrency(Duration::ZERO) != 7 {
        return Err("Expected hold target from the first instant".to_owned());
    }
    if profile.target_concurrency(secs(9)) != 7 {
        return Err("Expected hold target throughout".to_owned());
    }
    if profile.target_concurrency(secs(15)) != 4 {
        return Err("Expected ramp from the held value".to_owned());
    }
    Ok(())
}

#[test]
fn stage_index_tracks_elapsed() -> Result<(), String> {
    let profile = default_profile();
    let cases = [(0, Some(0)), (29, Some(0)), (30, Some(1)), (119, Some(2)), (120, None)];
    for (at, expected) in cases {
        if profile.stage_index(secs(at)) != expected {
            return Err(format!("Unexpected stage index at {}s", at));
        }
    }
    Ok(())
}

#[test]
fn decisions_issue_exact_deltas() -> Result<(), String> {
    if ScheduleDecision::between(3, 10) != ScheduleDecision::Spawn(7) {
        return Err("Expected spawn of 7".to_owned());
    }
    if ScheduleDecision::between(10, 4) != ScheduleDecision::Retire(6) {
        return Err("Expected retire of 6".to_owned());
    }
    if ScheduleDecision::between(4, 4) != ScheduleDecision::Hold {
        return Err("Expected hold".to_owned());
    }
    let scheduler = StageScheduler::new(default_profile(), secs(1));
    if scheduler.decide(secs(200), 20, ProfilePhase::ShuttingDown) != ScheduleDecision::Retire(20) {
        return Err("Expected full retire when shutting down".to_owned());
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn run_follows_profile_to_completion() -> Result<(), String> {
    let scheduler = StageScheduler::new(default_profile(), secs(1));
    let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
    let mut population = FakePopulation::default();
    let mut ticks = 0u64;
    let exit = scheduler
        .run(&mut population, &mut shutdown_rx, |_, _| {
            ticks = ticks.saturating_add(1);
            ControlFlow::Continue(())
        })
        .await;
    if exit != SchedulerExit::Completed {
        return Err(format!("Expected completion, got {:?}", exit));
    }
    if population.peak != 20 {
        return Err(format!("Expected peak of 20, got {}", population.peak));
    }
    if population.live > 1 {
        return Err(format!("Expected near-zero at the end, got {}", population.live));
    }
    if ticks < 100 || population.reaps != ticks {
        return Err(format!("Unexpected tick count {}", ticks));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn run_stops_when_hook_breaks() -> Result<(), String> {
    let scheduler = StageScheduler::new(default_profile(), secs(1));
    let (_shutdown_tx, mut shutdown_rx) = shutdown_channel();
    let mut population = FakePopulation::default();
    let exit = scheduler
        .run(&mut population, &mut shutdown_rx, |elapsed, _| {
            if elapsed >= secs(10) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .await;
    if exit != SchedulerExit::Aborted {
        return Err(format!("Expected abort, got {:?}", exit));
    }
    if population.live == 0 {
        return Err("Expected users to be live at abort time".to_owned());
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn run_returns_on_stop_request() -> Result<(), String> {
    let scheduler = StageScheduler::new(default_profile(), secs(1));
    let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
    if shutdown_tx.send(StopKind::Graceful).is_err() {
        return Err("Failed to send stop".to_owned());
    }
    let mut population = FakePopulation::default();
    let exit = scheduler
        .run(&mut population, &mut shutdown_rx, |_, _| ControlFlow::Continue(()))
        .await;
    if exit != SchedulerExit::Interrupted(StopKind::Graceful) {
        return Err(format!("Expected graceful interrupt, got {:?}", exit));
    }
    Ok(())
}
