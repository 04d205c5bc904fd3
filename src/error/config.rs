use std::path::PathBuf;

use thiserror::Error;

use super::{ThresholdError, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Config file must have .toml or .json extension.")]
    MissingExtension,
    #[error("Load profile requires at least one stage.")]
    MissingStages,
    #[error("Stage {index} has a negative target ({target}).")]
    NegativeStageTarget { index: usize, target: i64 },
    #[error("Stage {index} has an invalid duration: {source}")]
    InvalidStageDuration {
        index: usize,
        #[source]
        source: ValidationError,
    },
    #[error("Invalid '{field}': {source}")]
    InvalidDuration {
        field: &'static str,
        #[source]
        source: ValidationError,
    },
    #[error("Missing base_url (set --base-url or provide in config).")]
    MissingBaseUrl,
    #[error("Invalid base_url '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid threshold for '{metric}': {source}")]
    InvalidThreshold {
        metric: String,
        #[source]
        source: ThresholdError,
    },
    #[error("Config '{field}' must not be negative (got {value}).")]
    NegativeValue { field: &'static str, value: i64 },
    #[error("Invalid header: {source}")]
    InvalidHeader {
        #[source]
        source: ValidationError,
    },
    #[error("auth.login_path requires auth.email and auth.password.")]
    LoginMissingCredentials,
}
