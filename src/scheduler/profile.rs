use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub duration: Duration,
    pub target: u64,
    /// Step to `target` at the start of the stage instead of ramping.
    pub hold: bool,
}

impl Stage {
    #[must_use]
    pub const fn ramp(duration: Duration, target: u64) -> Self {
        Self {
            duration,
            target,
            hold: false,
        }
    }

    #[must_use]
    pub const fn hold(duration: Duration, target: u64) -> Self {
        Self {
            duration,
            target,
            hold: true,
        }
    }
}

/// How the target behaves once the profile has been walked to the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilePhase {
    /// Steady state at the final stage's target.
    Running,
    /// The harness is stopping; nothing should stay alive.
    ShuttingDown,
}

/// Piecewise-linear concurrency curve over elapsed time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageProfile {
    start: u64,
    stages: Vec<Stage>,
}

impl StageProfile {
    #[must_use]
    pub const fn new(start: u64, stages: Vec<Stage>) -> Self {
        Self { start, stages }
    }

    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.stages
            .iter()
            .fold(Duration::ZERO, |acc, stage| acc.saturating_add(stage.duration))
    }

    /// Highest concurrency the profile ever asks for.
    #[must_use]
    pub fn max_target(&self) -> u64 {
        self.stages
            .iter()
            .map(|stage| stage.target)
            .fold(self.start, u64::max)
    }

    #[must_use]
    pub fn target_concurrency(&self, elapsed: Duration) -> u64 {
        self.target_at(elapsed, ProfilePhase::Running)
    }

    #[must_use]
    pub fn target_at(&self, elapsed: Duration, phase: ProfilePhase) -> u64 {
        if phase == ProfilePhase::ShuttingDown {
            return 0;
        }
        let mut from = self.start;
        let mut stage_start = Duration::ZERO;
        for stage in &self.stages {
            let stage_end = stage_start.saturating_add(stage.duration);
            if elapsed < stage_end {
                if stage.hold {
                    return stage.target;
                }
                let into = elapsed.saturating_sub(stage_start);
                return interpolate(from, stage.target, into, stage.duration);
            }
            from = stage.target;
            stage_start = stage_end;
        }
        from
    }

    /// Index of the stage active at `elapsed`; `None` once the profile is over.
    /// Zero-length stages are never active.
    #[must_use]
    pub fn stage_index(&self, elapsed: Duration) -> Option<usize> {
        let mut stage_end = Duration::ZERO;
        self.stages.iter().position(|stage| {
            stage_end = stage_end.saturating_add(stage.duration);
            elapsed < stage_end
        })
    }
}

fn duration_nanos(duration: Duration) -> i128 {
    i128::try_from(duration.as_nanos()).unwrap_or(i128::MAX)
}

fn interpolate(from: u64, to: u64, into: Duration, span: Duration) -> u64 {
    let span_ns = duration_nanos(span);
    if span_ns <= 0 {
        return to;
    }
    let into_ns = duration_nanos(into).min(span_ns);
    let start = i128::from(from);
    let delta = i128::from(to).saturating_sub(start);
    let scaled = start
        .saturating_mul(span_ns)
        .saturating_add(delta.saturating_mul(into_ns));
    let value = div_round_half_away(scaled, span_ns);
    if value <= 0 {
        0
    } else {
        u64::try_from(value).unwrap_or(u64::MAX)
    }
}

/// Integer division rounding half away from zero. `den` must be positive.
fn div_round_half_away(num: i128, den: i128) -> i128 {
    let quotient = num.checked_div(den).unwrap_or(0);
    let remainder = num.checked_rem(den).unwrap_or(0);
    if remainder.saturating_abs().saturating_mul(2) >= den {
        quotient.saturating_add(num.signum())
    } else {
        quotient
    }
}
