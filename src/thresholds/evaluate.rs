use std::time::Duration;

use serde::Serialize;

use crate::metrics::{MetricSnapshot, MetricsAggregator};

use super::{Aggregation, Threshold};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdResult {
    pub metric: String,
    pub expression: String,
    /// `None` when the aggregation needed samples and there were none.
    pub observed: Option<f64>,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdReport {
    pub passed: bool,
    pub results: Vec<ThresholdResult>,
}

impl ThresholdReport {
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|result| !result.passed).count()
    }
}

/// Evaluates every threshold against the aggregator's current state.
/// An empty threshold list passes.
#[must_use]
pub fn evaluate(thresholds: &[Threshold], metrics: &MetricsAggregator) -> ThresholdReport {
    let results: Vec<ThresholdResult> = thresholds
        .iter()
        .map(|threshold| evaluate_one(threshold, &metrics.snapshot(&threshold.metric)))
        .collect();
    ThresholdReport {
        passed: results.iter().all(|result| result.passed),
        results,
    }
}

/// Mid-run check: the first `abort_on_fail` threshold whose delay has
/// elapsed and which currently fails.
///
/// Unlike the final verdict, a sample-derived threshold with no samples yet
/// is skipped here rather than failed: early ticks run before any request
/// has completed.
#[must_use]
pub fn first_abort_failure(
    thresholds: &[Threshold],
    metrics: &MetricsAggregator,
    elapsed: Duration,
) -> Option<ThresholdResult> {
    thresholds
        .iter()
        .filter(|threshold| threshold.abort_on_fail && elapsed >= threshold.delay_abort_eval)
        .filter_map(|threshold| {
            let snapshot = metrics.snapshot(&threshold.metric);
            if snapshot.is_empty() && threshold.expr.aggregation.is_sample_derived() {
                return None;
            }
            Some(evaluate_one(threshold, &snapshot))
        })
        .find(|result| !result.passed)
}

fn evaluate_one(threshold: &Threshold, snapshot: &MetricSnapshot) -> ThresholdResult {
    let expr = &threshold.expr;
    let observed = observe(expr.aggregation, snapshot);
    let passed = observed.is_some_and(|value| expr.comparator.compare(value, expr.literal));
    ThresholdResult {
        metric: threshold.metric.to_string(),
        expression: expr.source().to_owned(),
        observed,
        passed,
    }
}

fn observe(aggregation: Aggregation, snapshot: &MetricSnapshot) -> Option<f64> {
    match aggregation {
        Aggregation::Value => Some(snapshot.value().unwrap_or(0.0)),
        Aggregation::Count => Some(snapshot.total()),
        Aggregation::Rate => snapshot.rate(),
        Aggregation::Avg => snapshot.avg(),
        Aggregation::Min => snapshot.min,
        Aggregation::Max => snapshot.max,
        Aggregation::Med => snapshot.median(),
        Aggregation::Percentile(p) => snapshot.percentile(p),
    }
}
