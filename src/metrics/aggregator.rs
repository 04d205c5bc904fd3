use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde::Serialize;

use crate::checks::CheckResult;

use super::series::{MetricSnapshot, Series};
use super::{MetricKey, Sample, Tags};

/// Default shard count when the caller does not size the aggregator.
const DEFAULT_SHARDS: usize = 16;

#[derive(Debug, Default)]
struct Shard {
    series: HashMap<String, Series>,
    checks: BTreeMap<String, CheckTally>,
}

#[derive(Debug, Default, Clone, Copy)]
struct CheckTally {
    passes: u64,
    fails: u64,
}

/// Pass/fail counts for one named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub name: String,
    pub passes: u64,
    pub fails: u64,
}

/// Append-only metric store shared by every virtual user.
///
/// Writers pick a shard round-robin and hold its lock only for the in-memory
/// append. Readers merge all shards into owned snapshots. Sub-metrics
/// (`name{tag:value}`) must be tracked before the aggregator is shared; each
/// sample is fanned out to its base series and every matching sub-metric.
#[derive(Debug)]
pub struct MetricsAggregator {
    shards: Box<[Mutex<Shard>]>,
    next_shard: AtomicUsize,
    tracked: Vec<(MetricKey, String)>,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_SHARDS)
    }
}

impl MetricsAggregator {
    #[must_use]
    pub fn new(shards: usize) -> Self {
        let shards = (0..shards.max(1))
            .map(|_| Mutex::new(Shard::default()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            shards,
            next_shard: AtomicUsize::new(0),
            tracked: Vec::new(),
        }
    }

    /// Registers a sub-metric so that matching samples are aggregated under
    /// its own key. Plain metric names need no registration.
    pub fn track(&mut self, key: MetricKey) {
        if !key.is_submetric() || self.tracked.iter().any(|(known, _)| *known == key) {
            return;
        }
        let label = key.to_string();
        self.tracked.push((key, label));
    }

    #[must_use]
    pub fn tracked(&self) -> Vec<MetricKey> {
        self.tracked.iter().map(|(key, _)| key.clone()).collect()
    }

    fn shard(&self) -> Option<&Mutex<Shard>> {
        let idx = self
            .next_shard
            .fetch_add(1, Ordering::Relaxed)
            .checked_rem(self.shards.len())
            .unwrap_or(0);
        self.shards.get(idx)
    }

    fn keys_for(&self, metric: &str, tags: &Tags) -> Vec<&str> {
        self.tracked
            .iter()
            .filter(|(key, _)| key.matches(metric, tags))
            .map(|(_, label)| label.as_str())
            .collect()
    }

    pub fn record(&self, sample: &Sample) {
        let submetrics = self.keys_for(&sample.metric, &sample.tags);
        let Some(shard) = self.shard() else {
            return;
        };
        let mut shard = shard.lock();
        for key in std::iter::once(sample.metric.as_str()).chain(submetrics) {
            shard
                .series
                .entry(key.to_owned())
                .or_insert_with(|| Series::new(sample.kind))
                .add(sample.value, sample.timestamp);
        }
    }

    pub fn record_check(&self, result: &CheckResult) {
        let Some(shard) = self.shard() else {
            return;
        };
        let mut shard = shard.lock();
        let tally = shard.checks.entry(result.name.clone()).or_default();
        if result.passed {
            tally.passes = tally.passes.saturating_add(1);
        } else {
            tally.fails = tally.fails.saturating_add(1);
        }
    }

    /// Statistics for `key`; an empty snapshot when nothing was recorded.
    #[must_use]
    pub fn snapshot(&self, key: &MetricKey) -> MetricSnapshot {
        self.snapshot_named(&key.to_string())
    }

    /// Shards are locked one at a time and only while their series is
    /// copied out; merging and sorting run with no lock held.
    #[must_use]
    pub fn snapshot_named(&self, key: &str) -> MetricSnapshot {
        let mut acc: Option<Series> = None;
        for shard in self.shards.iter() {
            let shard = shard.lock();
            if let Some(series) = shard.series.get(key) {
                series.merge_into(acc.get_or_insert_with(|| Series::new(series.kind())));
            }
        }
        acc.map_or_else(MetricSnapshot::default, Series::into_snapshot)
    }

    /// Every recorded key, sorted by name.
    #[must_use]
    pub fn snapshot_all(&self) -> BTreeMap<String, MetricSnapshot> {
        let mut grouped: BTreeMap<String, Series> = BTreeMap::new();
        for shard in self.shards.iter() {
            let shard = shard.lock();
            for (key, series) in &shard.series {
                let acc = grouped
                    .entry(key.clone())
                    .or_insert_with(|| Series::new(series.kind()));
                series.merge_into(acc);
            }
        }
        grouped
            .into_iter()
            .map(|(key, series)| (key, series.into_snapshot()))
            .collect()
    }

    #[must_use]
    pub fn checks(&self) -> Vec<CheckSummary> {
        let mut merged_checks: BTreeMap<String, CheckTally> = BTreeMap::new();
        for shard in self.shards.iter() {
            let shard = shard.lock();
            for (name, tally) in &shard.checks {
                let acc = merged_checks.entry(name.clone()).or_default();
                acc.passes = acc.passes.saturating_add(tally.passes);
                acc.fails = acc.fails.saturating_add(tally.fails);
            }
        }
        merged_checks
            .into_iter()
            .map(|(name, tally)| CheckSummary {
                name,
                passes: tally.passes,
                fails: tally.fails,
            })
            .collect()
    }
}
