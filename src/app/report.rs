use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::args::OutputFormat;
use crate::error::{AppError, AppResult, RunError};
use crate::metrics::{CheckSummary, MetricKind, MetricSnapshot};
use crate::thresholds::ThresholdReport;
use crate::vu::VuStats;

/// How the run ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The stage profile ran to its end.
    Completed,
    /// A graceful stop was requested before the end.
    Interrupted,
    /// A hard stop cancelled every virtual user.
    HardStopped,
    /// An `abort_on_fail` threshold failed mid-run.
    AbortedByThreshold { metric: String, expression: String },
}

impl RunOutcome {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            RunOutcome::Completed => "completed".to_owned(),
            RunOutcome::Interrupted => "interrupted".to_owned(),
            RunOutcome::HardStopped => "hard stopped".to_owned(),
            RunOutcome::AbortedByThreshold { metric, expression } => {
                format!("aborted by threshold {} {}", metric, expression)
            }
        }
    }
}

/// Summary statistics for one metric key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub kind: Option<MetricKind>,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub med: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p90: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p95: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p99: Option<f64>,
}

impl MetricSummary {
    #[must_use]
    pub fn from_snapshot(snapshot: &MetricSnapshot) -> Self {
        let mut summary = Self {
            kind: snapshot.kind,
            count: snapshot.count,
            value: None,
            rate: None,
            avg: None,
            min: None,
            med: None,
            max: None,
            p90: None,
            p95: None,
            p99: None,
        };
        match snapshot.kind {
            Some(MetricKind::Counter) => summary.value = snapshot.value(),
            Some(MetricKind::Gauge) => {
                summary.value = snapshot.value();
                summary.min = snapshot.min;
                summary.max = snapshot.max;
            }
            Some(MetricKind::Rate) => summary.rate = snapshot.rate(),
            Some(MetricKind::Trend) => {
                summary.avg = snapshot.avg();
                summary.min = snapshot.min;
                summary.med = snapshot.median();
                summary.max = snapshot.max;
                summary.p90 = snapshot.percentile(90.0);
                summary.p95 = snapshot.percentile(95.0);
                summary.p99 = snapshot.percentile(99.0);
            }
            None => {}
        }
        summary
    }
}

/// Final result of a run. Always produced once load has started.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// RFC 3339 wall-clock start time.
    pub started_at: String,
    pub duration_ms: u64,
    pub outcome: RunOutcome,
    pub passed: bool,
    pub thresholds: ThresholdReport,
    pub checks: Vec<CheckSummary>,
    pub metrics: BTreeMap<String, MetricSummary>,
    pub vus: VuStats,
}

impl RunReport {
    #[must_use]
    pub fn metric(&self, key: &str) -> Option<&MetricSummary> {
        self.metrics.get(key)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[must_use]
    pub fn render_text(&self) -> String {
        let mut lines = vec![
            format!("Started: {}", self.started_at),
            format!("Duration: {}ms", self.duration_ms),
            format!("Outcome: {}", self.outcome.describe()),
            format!(
                "VUs: peak {}, spawned {}, completed {}, aborted {}",
                self.vus.peak, self.vus.spawned, self.vus.completed, self.vus.aborted
            ),
            String::new(),
            "Checks:".to_owned(),
        ];
        if self.checks.is_empty() {
            lines.push("  (none)".to_owned());
        }
        for check in &self.checks {
            let mark = if check.fails == 0 { "ok" } else { "FAIL" };
            lines.push(format!(
                "  [{}] {} ({} passed, {} failed)",
                mark, check.name, check.passes, check.fails
            ));
        }

        lines.push(String::new());
        lines.push("Metrics:".to_owned());
        for (key, summary) in &self.metrics {
            lines.push(format!("  {}: {}", key, render_metric(summary)));
        }

        lines.push(String::new());
        lines.push("Thresholds:".to_owned());
        for result in &self.thresholds.results {
            let observed = result
                .observed
                .map_or_else(|| "no samples".to_owned(), |value| format!("{:.4}", value));
            let mark = if result.passed { "ok" } else { "FAIL" };
            lines.push(format!(
                "  [{}] {} {} (observed {})",
                mark, result.metric, result.expression, observed
            ));
        }
        lines.push(String::new());
        lines.push(format!(
            "Result: {}",
            if self.passed { "PASSED" } else { "FAILED" }
        ));

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    /// Prints the report to stdout in `format`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn print(&self, format: OutputFormat) -> AppResult<()> {
        match format {
            OutputFormat::Text => print!("{}", self.render_text()),
            OutputFormat::Json => println!("{}", self.to_json()?),
        }
        Ok(())
    }

    /// Writes the JSON report to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub async fn export(&self, path: &Path) -> AppResult<()> {
        let json = self.to_json()?;
        let write = async {
            let mut file = tokio::fs::File::create(path).await?;
            file.write_all(json.as_bytes()).await?;
            file.write_all(b"\n").await?;
            file.flush().await
        };
        write.await.map_err(|err| {
            AppError::run(RunError::SummaryExport {
                path: path.display().to_string(),
                source: err,
            })
        })
    }
}

fn render_metric(summary: &MetricSummary) -> String {
    let fmt = |value: Option<f64>| value.map_or_else(|| "-".to_owned(), |v| format!("{:.2}", v));
    match summary.kind {
        Some(MetricKind::Counter) => fmt(summary.value),
        Some(MetricKind::Gauge) => format!(
            "{} (min {}, max {})",
            fmt(summary.value),
            fmt(summary.min),
            fmt(summary.max)
        ),
        Some(MetricKind::Rate) => format!(
            "{} of {}",
            summary
                .rate
                .map_or_else(|| "-".to_owned(), |rate| format!("{:.2}%", percent(rate))),
            summary.count
        ),
        Some(MetricKind::Trend) => format!(
            "avg={} min={} med={} max={} p(90)={} p(95)={} p(99)={}",
            fmt(summary.avg),
            fmt(summary.min),
            fmt(summary.med),
            fmt(summary.max),
            fmt(summary.p90),
            fmt(summary.p95),
            fmt(summary.p99)
        ),
        None => "no samples".to_owned(),
    }
}

#[expect(clippy::float_arithmetic, reason = "Rates are rendered as percentages")]
fn percent(rate: f64) -> f64 {
    rate * 100.0
}
