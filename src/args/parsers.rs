use std::time::Duration;

use crate::config::{parse_duration_or_zero, parse_duration_value};
use crate::error::{AppError, AppResult, ValidationError};
use crate::scheduler::Stage;
use crate::thresholds::Threshold;

pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.trim().to_owned()))
        }
        Some(_) | None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

pub(crate) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}

pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s).map_err(AppError::from)
}

pub(crate) fn parse_duration_or_zero_arg(s: &str) -> AppResult<Duration> {
    parse_duration_or_zero(s).map_err(AppError::from)
}

/// `DURATION:TARGET` or `DURATION:TARGET:hold`, e.g. `30s:20`.
pub(crate) fn parse_stage(s: &str) -> Result<Stage, ValidationError> {
    let mut parts = s.trim().split(':');
    let (Some(duration), Some(target)) = (parts.next(), parts.next()) else {
        return Err(ValidationError::InvalidStageFormat {
            value: s.to_owned(),
        });
    };
    let hold = match parts.next() {
        None => false,
        Some(flag) if flag.trim().eq_ignore_ascii_case("hold") => true,
        Some(_) => {
            return Err(ValidationError::InvalidStageFormat {
                value: s.to_owned(),
            });
        }
    };
    if parts.next().is_some() {
        return Err(ValidationError::InvalidStageFormat {
            value: s.to_owned(),
        });
    }
    let duration = parse_duration_or_zero(duration)?;
    let target: u64 =
        target
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidStageTarget {
                value: s.to_owned(),
                source: err,
            })?;
    Ok(Stage {
        duration,
        target,
        hold,
    })
}

/// `METRIC=EXPRESSION`, e.g. `http_req_failed=rate<0.01`.
pub(crate) fn parse_threshold_arg(s: &str) -> AppResult<Threshold> {
    let Some((metric, expression)) = s.split_once('=') else {
        return Err(AppError::validation(
            ValidationError::InvalidThresholdFormat {
                value: s.to_owned(),
            },
        ));
    };
    if metric.trim().is_empty() || expression.trim().is_empty() {
        return Err(AppError::validation(
            ValidationError::InvalidThresholdFormat {
                value: s.to_owned(),
            },
        ));
    }
    Threshold::parse(metric.trim(), expression.trim()).map_err(AppError::from)
}
