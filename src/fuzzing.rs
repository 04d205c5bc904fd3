use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::RunArgs;
use crate::args::parsers::{parse_header, parse_stage, parse_threshold_arg};
use crate::config::types::ConfigFile;
use crate::config::{RunConfig, apply_config, parse_duration_or_zero, parse_duration_value};
use crate::error::{AppError, AppResult};
use crate::scheduler::{ProfilePhase, Stage, StageProfile};
use crate::thresholds::{Threshold, ThresholdExpr};

thread_local! {
    static BASE_MATCHES: ArgMatches = RunArgs::command().get_matches_from(["rampart"]);
}

/// Parses a non-zero duration (e.g. `10s`, `1m30s`).
///
/// # Errors
///
/// Returns an error when the duration is invalid.
pub fn parse_duration_value_input(input: &str) -> AppResult<Duration> {
    parse_duration_value(input).map_err(AppError::from)
}

/// Parses a duration that may be zero.
///
/// # Errors
///
/// Returns an error when the duration is invalid.
pub fn parse_duration_or_zero_input(input: &str) -> AppResult<Duration> {
    parse_duration_or_zero(input).map_err(AppError::from)
}

/// Parses a threshold expression such as `p(95)<2000`.
///
/// # Errors
///
/// Returns an error when the expression is malformed.
pub fn parse_threshold_expression_input(input: &str) -> AppResult<ThresholdExpr> {
    input.parse::<ThresholdExpr>().map_err(AppError::from)
}

/// Parses a `METRIC=EXPRESSION` threshold argument.
///
/// # Errors
///
/// Returns an error when either side is malformed.
pub fn parse_threshold_arg_input(input: &str) -> AppResult<Threshold> {
    parse_threshold_arg(input)
}

/// Parses a `DURATION:TARGET[:hold]` stage argument.
///
/// # Errors
///
/// Returns an error when the stage is malformed.
pub fn parse_stage_input(input: &str) -> AppResult<Stage> {
    parse_stage(input).map_err(AppError::from)
}

/// Parses a `Name: Value` header argument.
///
/// # Errors
///
/// Returns an error when the header is malformed.
pub fn parse_header_input(input: &str) -> AppResult<(String, String)> {
    parse_header(input).map_err(AppError::from)
}

/// Target concurrency of `stages` at `elapsed`, while running and while shutting down.
#[must_use]
pub fn profile_targets(start: u64, stages: Vec<Stage>, elapsed: Duration) -> (u64, u64) {
    let profile = StageProfile::new(start, stages);
    (
        profile.target_at(elapsed, ProfilePhase::Running),
        profile.target_at(elapsed, ProfilePhase::ShuttingDown),
    )
}

/// Parses TOML config content, merges it over default flags and validates it.
///
/// # Errors
///
/// Returns an error when parsing, merging or validation fails.
pub fn apply_config_from_toml(input: &str) -> AppResult<()> {
    let config: ConfigFile = toml::from_str(input)?;
    apply_and_validate(&config)
}

/// Parses JSON config content, merges it over default flags and validates it.
///
/// # Errors
///
/// Returns an error when parsing, merging or validation fails.
pub fn apply_config_from_json(input: &[u8]) -> AppResult<()> {
    let config: ConfigFile = serde_json::from_slice(input)?;
    apply_and_validate(&config)
}

fn apply_and_validate(config: &ConfigFile) -> AppResult<()> {
    BASE_MATCHES.with(|matches| {
        let mut args = RunArgs::from_arg_matches(matches)?;
        apply_config(&mut args, matches, config)?;
        RunConfig::from_args(&args).map(drop)
    })
}
