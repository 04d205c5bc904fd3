//! Names and kinds of the metrics emitted by the engine itself.
use super::MetricKind;

pub const HTTP_REQS: &str = "http_reqs";
pub const HTTP_REQ_DURATION: &str = "http_req_duration";
pub const HTTP_REQ_FAILED: &str = "http_req_failed";
pub const CHECKS: &str = "checks";
pub const ITERATIONS: &str = "iterations";
pub const ITERATION_DURATION: &str = "iteration_duration";
pub const VUS: &str = "vus";
pub const VUS_MAX: &str = "vus_max";
pub const DATA_RECEIVED: &str = "data_received";

const BUILTIN: [(&str, MetricKind); 9] = [
    (HTTP_REQS, MetricKind::Counter),
    (HTTP_REQ_DURATION, MetricKind::Trend),
    (HTTP_REQ_FAILED, MetricKind::Rate),
    (CHECKS, MetricKind::Rate),
    (ITERATIONS, MetricKind::Counter),
    (ITERATION_DURATION, MetricKind::Trend),
    (VUS, MetricKind::Gauge),
    (VUS_MAX, MetricKind::Gauge),
    (DATA_RECEIVED, MetricKind::Counter),
];

/// Kind of a built-in metric, `None` for names the engine does not emit.
#[must_use]
pub fn kind_of(name: &str) -> Option<MetricKind> {
    BUILTIN
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, kind)| *kind)
}
