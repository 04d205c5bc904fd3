//! Named boolean assertions over responses.
//!
//! A check never fails the caller: the outcome is recorded into the metrics
//! aggregator (the `checks` rate plus a per-name tally) and handed back.
use std::panic::{AssertUnwindSafe, catch_unwind};

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::metrics::{MetricsAggregator, Sample, Tags, builtin};


/// Tag under which the check name is attached to `checks` samples.
pub const CHECK_TAG: &str = "check";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub timestamp: Instant,
}

/// A named predicate over a subject of type `T`.
pub struct Check<'pred, T: ?Sized> {
    pub name: &'static str,
    pub predicate: &'pred (dyn Fn(&T) -> bool + Sync),
}

impl<'pred, T: ?Sized> Check<'pred, T> {
    pub const fn new(name: &'static str, predicate: &'pred (dyn Fn(&T) -> bool + Sync)) -> Self {
        Self { name, predicate }
    }
}

/// Evaluates checks and records their results with a fixed base tag set.
pub struct CheckEvaluator<'ctx> {
    metrics: &'ctx MetricsAggregator,
    tags: &'ctx Tags,
}

impl<'ctx> CheckEvaluator<'ctx> {
    #[must_use]
    pub const fn new(metrics: &'ctx MetricsAggregator, tags: &'ctx Tags) -> Self {
        Self { metrics, tags }
    }

    /// Runs `predicate` against `subject`. A panicking predicate counts as a
    /// failed check.
    pub fn check<T, F>(&self, name: &str, subject: &T, predicate: F) -> CheckResult
    where
        T: ?Sized,
        F: FnOnce(&T) -> bool,
    {
        let passed = match catch_unwind(AssertUnwindSafe(|| predicate(subject))) {
            Ok(passed) => passed,
            Err(_) => {
                warn!("Check '{}' panicked; recording as failed.", name);
                false
            }
        };
        let result = CheckResult {
            name: name.to_owned(),
            passed,
            timestamp: Instant::now(),
        };
        self.record(&result);
        result
    }

    /// Runs every check in order and reports whether all of them passed.
    pub fn check_all<T: ?Sized>(&self, subject: &T, checks: &[Check<'_, T>]) -> bool {
        let mut all_passed = true;
        for check in checks {
            let result = self.check(check.name, subject, check.predicate);
            all_passed &= result.passed;
        }
        all_passed
    }

    fn record(&self, result: &CheckResult) {
        if !result.passed {
            debug!("Check failed: {}", result.name);
        }
        let mut tags = self.tags.clone();
        tags.insert(CHECK_TAG.to_owned(), result.name.clone());
        self.metrics
            .record(&Sample::rate(builtin::CHECKS, result.passed, tags));
        self.metrics.record_check(result);
    }
}
