mod app;
mod config;
mod http;
mod run;
mod setup;
mod threshold;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::{HttpError, TransportError};
pub use run::RunError;
pub use setup::SetupError;
pub use threshold::ThresholdError;
pub use validation::ValidationError;
