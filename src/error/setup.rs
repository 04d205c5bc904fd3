use thiserror::Error;

use super::TransportError;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Login request failed: {source}")]
    LoginTransport {
        #[source]
        source: TransportError,
    },
    #[error("Login returned status {status} (expected 2xx).")]
    LoginStatus { status: u16 },
    #[error("Login response has no token at '{path}'.")]
    MissingToken { path: String },
    #[error("Failed to encode login payload: {source}")]
    EncodePayload {
        #[source]
        source: serde_json::Error,
    },
}
