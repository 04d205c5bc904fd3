use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{failed} of {total} thresholds failed.")]
    ThresholdsFailed { failed: usize, total: usize },
    #[error("Failed to write summary export '{path}': {source}")]
    SummaryExport {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
