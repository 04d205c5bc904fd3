use std::time::Duration;

use crate::error::ThresholdError;
use crate::metrics::builtin;
use crate::scheduler::Stage;
use crate::thresholds::Threshold;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8090";
pub const DEFAULT_TOKEN_PATH: &str = "data.token";
pub(crate) const DEFAULT_PAUSE: &str = "1s";
pub(crate) const DEFAULT_TICK_INTERVAL: &str = "1s";
pub(crate) const DEFAULT_GRACEFUL_STOP: &str = "30s";
pub(crate) const DEFAULT_GRACEFUL_RAMP_DOWN: &str = "30s";
pub(crate) const DEFAULT_TIMEOUT: &str = "60s";
pub(crate) const DEFAULT_CONNECT_TIMEOUT: &str = "10s";

/// Ramp to 20 users over 30s, hold for a minute, ramp down over 30s.
#[must_use]
pub fn default_stages() -> Vec<Stage> {
    vec![
        Stage::ramp(Duration::from_secs(30), 20),
        Stage::ramp(Duration::from_secs(60), 20),
        Stage::ramp(Duration::from_secs(30), 0),
    ]
}

/// p95 latency under 2s and under 1% failed requests.
///
/// # Errors
///
/// Never fails for the built-in expressions; the error type is shared with
/// user-supplied thresholds.
pub fn default_thresholds() -> Result<Vec<Threshold>, ThresholdError> {
    Ok(vec![
        Threshold::parse(builtin::HTTP_REQ_DURATION, "p(95)<2000")?,
        Threshold::parse(builtin::HTTP_REQ_FAILED, "rate<0.01")?,
    ])
}
