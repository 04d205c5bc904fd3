use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::error::SetupError;
use crate::http::{HttpMethod, HttpRequest, Transport};

/// Read-only data produced once before load and shared with every user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupData {
    /// Bearer token; empty means requests go out unauthenticated.
    pub token: String,
}

/// One-time preparation executed before any virtual user starts.
#[async_trait]
pub trait Setup: Send + Sync {
    /// # Errors
    ///
    /// Any error aborts the run before load is generated.
    async fn run(&self) -> Result<SetupData, SetupError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub url: String,
    pub email: String,
    pub password: String,
    /// Dotted path of the token in the login response.
    pub token_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    None,
    Static(String),
    Login(LoginRequest),
}

/// Produces the bearer token either from configuration or by logging in
/// through the run's transport.
pub struct TokenSetup {
    source: TokenSource,
    transport: Arc<dyn Transport>,
}

impl TokenSetup {
    #[must_use]
    pub fn new(source: TokenSource, transport: Arc<dyn Transport>) -> Self {
        Self { source, transport }
    }

    async fn login(&self, login: &LoginRequest) -> Result<String, SetupError> {
        let payload = json!({ "email": login.email, "password": login.password });
        let body = serde_json::to_vec(&payload)
            .map_err(|err| SetupError::EncodePayload { source: err })?;
        let request = HttpRequest::new(HttpMethod::Post, login.url.clone())
            .header("Content-Type", "application/json")
            .body(body);
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| SetupError::LoginTransport { source: err })?;
        if !(200..300).contains(&response.status) {
            return Err(SetupError::LoginStatus {
                status: response.status,
            });
        }
        response
            .json_str(&login.token_path)
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| SetupError::MissingToken {
                path: login.token_path.clone(),
            })
    }
}

#[async_trait]
impl Setup for TokenSetup {
    async fn run(&self) -> Result<SetupData, SetupError> {
        let token = match &self.source {
            TokenSource::None => {
                info!("No token configured; requests are sent without Authorization.");
                String::new()
            }
            TokenSource::Static(token) => token.clone(),
            TokenSource::Login(login) => {
                info!("Acquiring token from {}", login.url);
                self.login(login).await?
            }
        };
        Ok(SetupData { token })
    }
}
