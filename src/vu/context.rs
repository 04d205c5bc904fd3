use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::warn;

use crate::app::SetupData;
use crate::checks::{Check, CheckEvaluator};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::metrics::{MetricsAggregator, Sample, Tags, builtin};

pub const SCENARIO_TAG: &str = "scenario";
pub const STEP_TAG: &str = "step";
pub const METHOD_TAG: &str = "method";
pub const STATUS_TAG: &str = "status";

/// Everything a virtual user reads but never mutates. Shared by all users of
/// a run.
pub struct RunContext {
    pub base_url: String,
    pub transport: Arc<dyn Transport>,
    pub metrics: Arc<MetricsAggregator>,
    pub setup: SetupData,
    /// Extra headers sent with every request.
    pub headers: Vec<(String, String)>,
    pub pause: Duration,
    pub scenario: &'static str,
}

impl RunContext {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Request, check and pause helpers bound to one virtual user.
pub struct VuContext {
    id: u64,
    run: Arc<RunContext>,
}

impl VuContext {
    #[must_use]
    pub const fn new(id: u64, run: Arc<RunContext>) -> Self {
        Self { id, run }
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn metrics(&self) -> &MetricsAggregator {
        &self.run.metrics
    }

    fn step_tags(&self, step: &str) -> Tags {
        let mut tags = Tags::new();
        tags.insert(SCENARIO_TAG.to_owned(), self.run.scenario.to_owned());
        tags.insert(STEP_TAG.to_owned(), step.to_owned());
        tags
    }

    /// Tags shared by every sample of this user outside a step.
    #[must_use]
    pub fn scenario_tags(&self) -> Tags {
        let mut tags = Tags::new();
        tags.insert(SCENARIO_TAG.to_owned(), self.run.scenario.to_owned());
        tags
    }

    /// Performs one exchange and records `http_reqs`, `http_req_duration`,
    /// `http_req_failed` and `data_received`. When no response arrives the
    /// returned response has status 0 and an empty body, so checks on it fail.
    pub async fn request(
        &self,
        step: &str,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> HttpResponse {
        let mut request = HttpRequest::new(method, self.run.url(path))
            .header("Content-Type", "application/json");
        if !self.run.setup.token.is_empty() {
            request = request.header(
                "Authorization",
                &format!("Bearer {}", self.run.setup.token),
            );
        }
        for (name, value) in &self.run.headers {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            match serde_json::to_vec(body) {
                Ok(bytes) => request = request.body(bytes),
                Err(err) => warn!("VU {}: failed to encode {} body: {}", self.id, step, err),
            }
        }

        let mut tags = self.step_tags(step);
        tags.insert(METHOD_TAG.to_owned(), method.as_str().to_owned());

        let started = Instant::now();
        let response = match self.run.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!("VU {}: {} {} failed: {}", self.id, method, path, err);
                HttpResponse::new(0, Vec::new(), started.elapsed())
            }
        };
        tags.insert(STATUS_TAG.to_owned(), response.status.to_string());
        self.record_exchange(&response, tags);
        response
    }

    fn record_exchange(&self, response: &HttpResponse, tags: Tags) {
        let metrics = &self.run.metrics;
        #[expect(clippy::cast_precision_loss, reason = "Byte counts stay far below 2^52")]
        let received = response.body.len() as f64;
        metrics.record(&Sample::counter(builtin::HTTP_REQS, 1.0, tags.clone()));
        metrics.record(&Sample::trend(
            builtin::HTTP_REQ_DURATION,
            duration_ms(response.duration),
            tags.clone(),
        ));
        metrics.record(&Sample::rate(
            builtin::HTTP_REQ_FAILED,
            response.is_failure(),
            tags.clone(),
        ));
        metrics.record(&Sample::counter(
            builtin::DATA_RECEIVED,
            received,
            tags,
        ));
    }

    /// Evaluates `checks` against `subject`, tagging results with `step`.
    pub fn check_all<T: ?Sized>(&self, step: &str, subject: &T, checks: &[Check<'_, T>]) -> bool {
        let tags = self.step_tags(step);
        CheckEvaluator::new(&self.run.metrics, &tags).check_all(subject, checks)
    }

    /// Think time between steps.
    pub async fn pause(&self) {
        if !self.run.pause.is_zero() {
            tokio::time::sleep(self.run.pause).await;
        }
    }
}

#[expect(clippy::float_arithmetic, reason = "Trend samples are in milliseconds")]
pub(crate) fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
