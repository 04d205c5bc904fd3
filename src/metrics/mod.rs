//! Metric samples, sharded aggregation, and snapshot statistics.
mod aggregator;
pub mod builtin;
mod percentile;
mod selector;
mod series;
mod types;


pub use aggregator::{CheckSummary, MetricsAggregator};
pub use percentile::percentile;
pub use selector::MetricKey;
pub use series::MetricSnapshot;
pub use types::{MetricKind, Sample, Tags};
