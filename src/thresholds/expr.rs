use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ThresholdError;
use crate::metrics::{MetricKey, MetricKind, builtin};

/// Left-hand side of a threshold expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregation {
    Value,
    Count,
    Rate,
    Avg,
    Min,
    Max,
    Med,
    Percentile(f64),
}

impl Aggregation {
    /// Aggregations that need at least one sample to exist. These fail
    /// closed on an empty series; `count` and `value` evaluate as 0 instead.
    #[must_use]
    pub const fn is_sample_derived(self) -> bool {
        !matches!(self, Aggregation::Value | Aggregation::Count)
    }

    #[must_use]
    pub const fn supports(self, kind: MetricKind) -> bool {
        match kind {
            MetricKind::Counter => matches!(self, Aggregation::Count | Aggregation::Value),
            MetricKind::Gauge => matches!(
                self,
                Aggregation::Value | Aggregation::Min | Aggregation::Max
            ),
            MetricKind::Rate => matches!(self, Aggregation::Rate | Aggregation::Count),
            MetricKind::Trend => !matches!(self, Aggregation::Value | Aggregation::Rate),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Value => f.write_str("value"),
            Aggregation::Count => f.write_str("count"),
            Aggregation::Rate => f.write_str("rate"),
            Aggregation::Avg => f.write_str("avg"),
            Aggregation::Min => f.write_str("min"),
            Aggregation::Max => f.write_str("max"),
            Aggregation::Med => f.write_str("med"),
            Aggregation::Percentile(p) => write!(f, "p({})", p),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Comparator {
    #[must_use]
    pub fn compare(self, left: f64, right: f64) -> bool {
        match self {
            Comparator::Lt => left < right,
            Comparator::Le => left <= right,
            Comparator::Gt => left > right,
            Comparator::Ge => left >= right,
            Comparator::Eq => left.total_cmp(&right).is_eq(),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Eq => "==",
        }
    }
}

/// A parsed expression such as `p(95)<2000` or `rate<0.01`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdExpr {
    pub aggregation: Aggregation,
    pub comparator: Comparator,
    pub literal: f64,
    source: String,
}

impl ThresholdExpr {
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl FromStr for ThresholdExpr {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expression = s.trim();
        if expression.is_empty() {
            return Err(ThresholdError::EmptyExpression);
        }
        let (left, comparator, right) = split_comparator(expression)?;
        let aggregation = parse_aggregation(left.trim(), expression)?;
        let literal_text = right.trim();
        let literal: f64 = literal_text
            .parse()
            .ok()
            .filter(|value: &f64| value.is_finite())
            .ok_or_else(|| ThresholdError::InvalidLiteral {
                value: literal_text.to_owned(),
                expression: expression.to_owned(),
            })?;
        Ok(Self {
            aggregation,
            comparator,
            literal,
            source: expression.to_owned(),
        })
    }
}

fn split_comparator(expression: &str) -> Result<(&str, Comparator, &str), ThresholdError> {
    let idx = expression
        .find(['<', '>', '='])
        .ok_or_else(|| ThresholdError::MissingComparator {
            expression: expression.to_owned(),
        })?;
    let (left, rest) = expression.split_at(idx);
    let operators = [
        ("===", Comparator::Eq),
        ("==", Comparator::Eq),
        ("<=", Comparator::Le),
        (">=", Comparator::Ge),
        ("<", Comparator::Lt),
        (">", Comparator::Gt),
    ];
    for (token, comparator) in operators {
        if let Some(right) = rest.strip_prefix(token) {
            return Ok((left, comparator, right));
        }
    }
    Err(ThresholdError::MissingComparator {
        expression: expression.to_owned(),
    })
}

fn parse_aggregation(left: &str, expression: &str) -> Result<Aggregation, ThresholdError> {
    match left {
        "value" => return Ok(Aggregation::Value),
        "count" => return Ok(Aggregation::Count),
        "rate" => return Ok(Aggregation::Rate),
        "avg" => return Ok(Aggregation::Avg),
        "min" => return Ok(Aggregation::Min),
        "max" => return Ok(Aggregation::Max),
        "med" => return Ok(Aggregation::Med),
        _ => {}
    }
    let Some(inner) = left
        .strip_prefix("p(")
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return Err(ThresholdError::UnknownAggregation {
            aggregation: left.to_owned(),
            expression: expression.to_owned(),
        });
    };
    inner
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| (0.0..=100.0).contains(p))
        .map(Aggregation::Percentile)
        .ok_or_else(|| ThresholdError::InvalidPercentile {
            value: inner.to_owned(),
            expression: expression.to_owned(),
        })
}

/// One configured threshold, immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    pub metric: MetricKey,
    pub expr: ThresholdExpr,
    /// Evaluate during the run and stop the test on failure.
    pub abort_on_fail: bool,
    /// Grace period before mid-run evaluation starts.
    pub delay_abort_eval: Duration,
}

impl Threshold {
    /// Parses `metric` (optionally with a tag selector) and `expression`.
    ///
    /// # Errors
    ///
    /// Returns an error when either side is malformed or when the aggregation
    /// does not apply to the kind of a built-in metric.
    pub fn parse(metric: &str, expression: &str) -> Result<Self, ThresholdError> {
        let metric: MetricKey = metric.parse()?;
        let expr: ThresholdExpr = expression.parse()?;
        if let Some(kind) = builtin::kind_of(&metric.name)
            && !expr.aggregation.supports(kind)
        {
            return Err(ThresholdError::UnsupportedAggregation {
                aggregation: expr.aggregation.to_string(),
                kind: kind.as_str(),
                metric: metric.name,
            });
        }
        Ok(Self {
            metric,
            expr,
            abort_on_fail: false,
            delay_abort_eval: Duration::ZERO,
        })
    }

    #[must_use]
    pub const fn aborting(mut self, delay: Duration) -> Self {
        self.abort_on_fail = true;
        self.delay_abort_eval = delay;
        self
    }
}
