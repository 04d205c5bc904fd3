use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{RunArgs, parse_header};
use crate::error::{AppError, AppResult, ConfigError};
use crate::scheduler::Stage;
use crate::thresholds::Threshold;

use super::types::{ConfigFile, DurationValue, StageConfig, ThresholdEntry};

/// Values given on the command line or through an environment variable win
/// over the config file.
fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

/// Copies config file values into `args` wherever the user did not set the
/// corresponding flag.
///
/// # Errors
///
/// Returns an error when a config value is malformed.
pub fn apply_config(args: &mut RunArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    if !is_explicit(matches, "base_url")
        && let Some(base_url) = config.base_url.clone()
    {
        args.base_url = Some(base_url);
    }

    if !is_explicit(matches, "stages")
        && let Some(stages) = config.stages.as_ref()
    {
        args.stages = parse_stages(stages)?;
    }

    if !is_explicit(matches, "start_vus")
        && let Some(start_vus) = config.start_vus
    {
        args.start_vus = u64::try_from(start_vus).map_err(|_err| {
            AppError::config(ConfigError::NegativeValue {
                field: "start_vus",
                value: start_vus,
            })
        })?;
    }

    if !is_explicit(matches, "thresholds")
        && let Some(thresholds) = config.thresholds.as_ref()
    {
        let mut parsed = Vec::new();
        for (metric, spec) in thresholds {
            for entry in spec.entries() {
                parsed.push(parse_threshold_entry(metric, entry)?);
            }
        }
        args.thresholds = parsed;
    }

    apply_durations(args, matches, config)?;

    if !is_explicit(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(
                parse_header(header)
                    .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?,
            );
        }
        args.headers = parsed;
    }

    if let Some(auth) = config.auth.as_ref() {
        if !is_explicit(matches, "token") && auth.token.is_some() {
            args.token.clone_from(&auth.token);
        }
        if !is_explicit(matches, "login_path") && auth.login_path.is_some() {
            args.login_path.clone_from(&auth.login_path);
        }
        if !is_explicit(matches, "login_email") && auth.email.is_some() {
            args.login_email.clone_from(&auth.email);
        }
        if !is_explicit(matches, "login_password") && auth.password.is_some() {
            args.login_password.clone_from(&auth.password);
        }
        if !is_explicit(matches, "token_path") && auth.token_path.is_some() {
            args.token_path.clone_from(&auth.token_path);
        }
    }

    if !is_explicit(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = format;
    }

    if !is_explicit(matches, "summary_export")
        && let Some(path) = config.summary_export.clone()
    {
        args.summary_export = Some(path);
    }

    if !is_explicit(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    Ok(())
}

fn apply_durations(args: &mut RunArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    if !is_explicit(matches, "pause")
        && let Some(value) = config.pause_duration.as_ref()
    {
        args.pause = duration_or_zero(value, "pause_duration")?;
    }
    if !is_explicit(matches, "tick_interval")
        && let Some(value) = config.tick_interval.as_ref()
    {
        args.tick_interval = duration(value, "tick_interval")?;
    }
    if !is_explicit(matches, "graceful_stop")
        && let Some(value) = config.graceful_stop.as_ref()
    {
        args.graceful_stop = duration_or_zero(value, "graceful_stop")?;
    }
    if !is_explicit(matches, "graceful_ramp_down")
        && let Some(value) = config.graceful_ramp_down.as_ref()
    {
        args.graceful_ramp_down = duration_or_zero(value, "graceful_ramp_down")?;
    }
    if !is_explicit(matches, "request_timeout")
        && let Some(value) = config.timeout.as_ref()
    {
        args.request_timeout = duration(value, "timeout")?;
    }
    if !is_explicit(matches, "connect_timeout")
        && let Some(value) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = duration(value, "connect_timeout")?;
    }
    Ok(())
}

fn duration(value: &DurationValue, field: &'static str) -> AppResult<std::time::Duration> {
    value
        .to_duration()
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}

fn duration_or_zero(value: &DurationValue, field: &'static str) -> AppResult<std::time::Duration> {
    value
        .to_duration_or_zero()
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}

pub(crate) fn parse_stages(stages: &[StageConfig]) -> AppResult<Vec<Stage>> {
    if stages.is_empty() {
        return Err(AppError::config(ConfigError::MissingStages));
    }
    let mut parsed = Vec::with_capacity(stages.len());
    for (idx, stage) in stages.iter().enumerate() {
        let index = idx.saturating_add(1);
        let target = u64::try_from(stage.target).map_err(|_err| {
            AppError::config(ConfigError::NegativeStageTarget {
                index,
                target: stage.target,
            })
        })?;
        let duration = stage.duration.to_duration_or_zero().map_err(|err| {
            AppError::config(ConfigError::InvalidStageDuration { index, source: err })
        })?;
        parsed.push(Stage {
            duration,
            target,
            hold: stage.hold,
        });
    }
    Ok(parsed)
}

fn parse_threshold_entry(metric: &str, entry: &ThresholdEntry) -> AppResult<Threshold> {
    let invalid = |err| {
        AppError::config(ConfigError::InvalidThreshold {
            metric: metric.to_owned(),
            source: err,
        })
    };
    match entry {
        ThresholdEntry::Expression(expression) => {
            Threshold::parse(metric, expression).map_err(invalid)
        }
        ThresholdEntry::Detailed(object) => {
            let threshold = Threshold::parse(metric, &object.threshold).map_err(invalid)?;
            if !object.abort_on_fail {
                return Ok(threshold);
            }
            let delay = match object.delay_abort_eval.as_ref() {
                Some(value) => duration_or_zero(value, "delay_abort_eval")?,
                None => std::time::Duration::ZERO,
            };
            Ok(threshold.aborting(delay))
        }
    }
}
