use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::args::OutputFormat;
use crate::error::ValidationError;

/// On-disk configuration (`rampart.toml` / `rampart.json`). Every field is
/// optional; CLI flags win over file values.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(alias = "baseUrl")]
    pub base_url: Option<String>,
    pub stages: Option<Vec<StageConfig>>,
    #[serde(alias = "startVUs")]
    pub start_vus: Option<i64>,
    pub thresholds: Option<BTreeMap<String, ThresholdSpec>>,
    #[serde(alias = "pauseDuration", alias = "pause")]
    pub pause_duration: Option<DurationValue>,
    #[serde(alias = "tickInterval")]
    pub tick_interval: Option<DurationValue>,
    #[serde(alias = "gracefulStop")]
    pub graceful_stop: Option<DurationValue>,
    #[serde(alias = "gracefulRampDown")]
    pub graceful_ramp_down: Option<DurationValue>,
    pub timeout: Option<DurationValue>,
    #[serde(alias = "connectTimeout")]
    pub connect_timeout: Option<DurationValue>,
    pub headers: Option<Vec<String>>,
    pub auth: Option<AuthConfig>,
    #[serde(alias = "outputFormat")]
    pub output_format: Option<OutputFormat>,
    #[serde(alias = "summaryExport")]
    pub summary_export: Option<String>,
    pub no_color: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    pub duration: DurationValue,
    pub target: i64,
    #[serde(default)]
    pub hold: bool,
}

/// A list of expressions, optionally as objects carrying abort settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThresholdSpec {
    Expressions(Vec<ThresholdEntry>),
    Single(ThresholdEntry),
}

impl ThresholdSpec {
    #[must_use]
    pub fn entries(&self) -> Vec<&ThresholdEntry> {
        match self {
            ThresholdSpec::Expressions(entries) => entries.iter().collect(),
            ThresholdSpec::Single(entry) => vec![entry],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThresholdEntry {
    Expression(String),
    Detailed(ThresholdObject),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdObject {
    pub threshold: String,
    #[serde(default, alias = "abortOnFail")]
    pub abort_on_fail: bool,
    #[serde(alias = "delayAbortEval")]
    pub delay_abort_eval: Option<DurationValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub token: Option<String>,
    #[serde(alias = "loginPath")]
    pub login_path: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "tokenPath")]
    pub token_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        let duration = self.to_duration_or_zero()?;
        if duration.is_zero() {
            return Err(ValidationError::DurationZero);
        }
        Ok(duration)
    }

    pub(crate) fn to_duration_or_zero(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => super::parse_duration_or_zero(text),
        }
    }
}
