use std::time::Duration;

use crate::error::ValidationError;

/// Parses `500ms`, `30s`, `2m`, `1h`, compounds such as `1m30s`, or bare
/// seconds. Zero is rejected.
pub(crate) fn parse_duration_value(value: &str) -> Result<Duration, ValidationError> {
    let duration = parse_duration_or_zero(value)?;
    if duration.is_zero() {
        return Err(ValidationError::DurationZero);
    }
    Ok(duration)
}

/// Like [`parse_duration_value`] but accepts zero (`0s`, `0`).
pub(crate) fn parse_duration_or_zero(value: &str) -> Result<Duration, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let mut total = Duration::ZERO;
    let mut rest = value;
    let mut first = true;
    while !rest.is_empty() {
        let digits_len = rest
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits_len == 0 {
            return Err(ValidationError::InvalidDurationFormat {
                value: value.to_owned(),
            });
        }
        let (num_part, tail) = rest.split_at(digits_len);
        let number: u64 =
            num_part
                .parse()
                .map_err(|err| ValidationError::InvalidDurationNumber {
                    value: value.to_owned(),
                    source: err,
                })?;
        let unit_len = tail
            .find(|ch: char| ch.is_ascii_digit())
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);
        if unit.is_empty() && !first {
            return Err(ValidationError::InvalidDurationFormat {
                value: value.to_owned(),
            });
        }

        let part = match unit {
            "" | "s" => Duration::from_secs(number),
            "ms" => Duration::from_millis(number),
            "m" => Duration::from_secs(
                number
                    .checked_mul(60)
                    .ok_or(ValidationError::DurationOverflow)?,
            ),
            "h" => Duration::from_secs(
                number
                    .checked_mul(3600)
                    .ok_or(ValidationError::DurationOverflow)?,
            ),
            other => {
                return Err(ValidationError::InvalidDurationUnit {
                    unit: other.to_owned(),
                });
            }
        };
        total = total
            .checked_add(part)
            .ok_or(ValidationError::DurationOverflow)?;
        rest = next;
        first = false;
    }

    Ok(total)
}
