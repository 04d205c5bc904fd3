use tokio::time::Instant;

use super::{MetricKind, percentile};

/// Running state for one metric key inside one shard.
#[derive(Debug, Clone)]
pub(super) struct Series {
    kind: MetricKind,
    count: u64,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
    last: Option<(Instant, f64)>,
    hits: u64,
    values: Vec<f64>,
}

impl Series {
    pub(super) const fn new(kind: MetricKind) -> Self {
        Self {
            kind,
            count: 0,
            sum: 0.0,
            min: None,
            max: None,
            last: None,
            hits: 0,
            values: Vec::new(),
        }
    }

    #[expect(clippy::float_arithmetic, reason = "Metric sums are floating point")]
    pub(super) fn add(&mut self, value: f64, at: Instant) {
        self.count = self.count.saturating_add(1);
        self.sum += value;
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = Some(self.max.map_or(value, |max| max.max(value)));
        if self.last.is_none_or(|(seen, _)| seen <= at) {
            self.last = Some((at, value));
        }
        match self.kind {
            MetricKind::Rate => {
                if value != 0.0 {
                    self.hits = self.hits.saturating_add(1);
                }
            }
            MetricKind::Trend => self.values.push(value),
            MetricKind::Counter | MetricKind::Gauge => {}
        }
    }

    #[expect(clippy::float_arithmetic, reason = "Metric sums are floating point")]
    pub(super) fn merge_into(&self, acc: &mut Series) {
        acc.count = acc.count.saturating_add(self.count);
        acc.sum += self.sum;
        acc.hits = acc.hits.saturating_add(self.hits);
        acc.min = match (acc.min, self.min) {
            (Some(left), Some(right)) => Some(left.min(right)),
            (left, right) => left.or(right),
        };
        acc.max = match (acc.max, self.max) {
            (Some(left), Some(right)) => Some(left.max(right)),
            (left, right) => left.or(right),
        };
        acc.last = match (acc.last, self.last) {
            (Some(left), Some(right)) => Some(if right.0 >= left.0 { right } else { left }),
            (left, right) => left.or(right),
        };
        acc.values.extend_from_slice(&self.values);
    }

    pub(super) const fn kind(&self) -> MetricKind {
        self.kind
    }

    pub(super) fn into_snapshot(mut self) -> MetricSnapshot {
        self.values.sort_unstable_by(f64::total_cmp);
        MetricSnapshot {
            kind: Some(self.kind),
            count: self.count,
            sum: self.sum,
            min: self.min,
            max: self.max,
            last: self.last.map(|(_, value)| value),
            hits: self.hits,
            sorted: self.values,
        }
    }
}

/// Point-in-time statistics for one metric key, merged across shards.
///
/// A snapshot owns its data; calling `snapshot` again without new records
/// yields an equal value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSnapshot {
    /// `None` when nothing was ever recorded under the key.
    pub kind: Option<MetricKind>,
    pub count: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub last: Option<f64>,
    pub hits: u64,
    sorted: Vec<f64>,
}

impl MetricSnapshot {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Percentile over trend samples, `None` when there are none.
    #[must_use]
    pub fn percentile(&self, p: f64) -> Option<f64> {
        percentile(&self.sorted, p)
    }

    #[must_use]
    pub fn median(&self) -> Option<f64> {
        self.percentile(50.0)
    }

    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "Averages are floating point")]
    pub fn avg(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        #[expect(clippy::cast_precision_loss, reason = "Counts stay far below 2^52")]
        let count = self.count as f64;
        Some(self.sum / count)
    }

    /// Fraction of non-zero samples, `None` when empty.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "Rates are floating point")]
    pub fn rate(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        #[expect(clippy::cast_precision_loss, reason = "Counts stay far below 2^52")]
        let ratio = self.hits as f64 / self.count as f64;
        Some(ratio)
    }

    /// `rate()` with an empty series reported as zero errors. Meaningful for
    /// failure-flag metrics such as `http_req_failed`.
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        self.rate().unwrap_or(0.0)
    }

    /// Counter total or last gauge reading.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self.kind? {
            MetricKind::Counter => Some(self.sum),
            MetricKind::Gauge => self.last,
            MetricKind::Rate | MetricKind::Trend => None,
        }
    }

    /// Counter total, or the number of samples for every other kind.
    #[must_use]
    pub fn total(&self) -> f64 {
        match self.kind {
            Some(MetricKind::Counter) => self.sum,
            Some(MetricKind::Gauge | MetricKind::Rate | MetricKind::Trend) | None => {
                #[expect(clippy::cast_precision_loss, reason = "Counts stay far below 2^52")]
                let count = self.count as f64;
                count
            }
        }
    }
}
