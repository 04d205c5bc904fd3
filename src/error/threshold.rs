use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThresholdError {
    #[error("Threshold expression must not be empty.")]
    EmptyExpression,
    #[error("Threshold '{expression}' has no comparator. Use <, <=, >, >=, or ==.")]
    MissingComparator { expression: String },
    #[error("Unknown aggregation '{aggregation}' in '{expression}'.")]
    UnknownAggregation {
        aggregation: String,
        expression: String,
    },
    #[error("Invalid percentile '{value}' in '{expression}'. Use p(N) with 0 <= N <= 100.")]
    InvalidPercentile { value: String, expression: String },
    #[error("Invalid threshold value '{value}' in '{expression}'.")]
    InvalidLiteral { value: String, expression: String },
    #[error("Invalid metric selector '{selector}'. Expected name{{tag:value,...}}.")]
    InvalidSelector { selector: String },
    #[error("Aggregation '{aggregation}' is not supported for {kind} metric '{metric}'.")]
    UnsupportedAggregation {
        aggregation: String,
        kind: &'static str,
        metric: String,
    },
}
