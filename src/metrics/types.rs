use std::collections::BTreeMap;

use serde::Serialize;
use tokio::time::Instant;

/// Tag set attached to a sample, e.g. `step=create`, `method=POST`, `status=201`.
pub type Tags = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Cumulative sum.
    Counter,
    /// Last observed value.
    Gauge,
    /// Fraction of non-zero samples.
    Rate,
    /// Distribution of values, queried by percentile.
    Trend,
}

impl MetricKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Rate => "rate",
            MetricKind::Trend => "trend",
        }
    }
}

/// One immutable observation. Samples are only ever appended.
#[derive(Debug, Clone)]
pub struct Sample {
    pub metric: String,
    pub kind: MetricKind,
    pub value: f64,
    pub timestamp: Instant,
    pub tags: Tags,
}

impl Sample {
    #[must_use]
    pub fn new(metric: &str, kind: MetricKind, value: f64, tags: Tags) -> Self {
        Self {
            metric: metric.to_owned(),
            kind,
            value,
            timestamp: Instant::now(),
            tags,
        }
    }

    #[must_use]
    pub fn counter(metric: &str, value: f64, tags: Tags) -> Self {
        Self::new(metric, MetricKind::Counter, value, tags)
    }

    #[must_use]
    pub fn gauge(metric: &str, value: f64, tags: Tags) -> Self {
        Self::new(metric, MetricKind::Gauge, value, tags)
    }

    #[must_use]
    pub fn rate(metric: &str, hit: bool, tags: Tags) -> Self {
        Self::new(metric, MetricKind::Rate, if hit { 1.0 } else { 0.0 }, tags)
    }

    #[must_use]
    pub fn trend(metric: &str, value: f64, tags: Tags) -> Self {
        Self::new(metric, MetricKind::Trend, value, tags)
    }
}
