use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::error::TransportError;

use super::json::lookup_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: HttpMethod, url: String) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// A completed exchange. The body is decoded as JSON at most once, on first
/// field access.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub duration: Duration,
    parsed: OnceCell<Option<Value>>,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: Vec<u8>, duration: Duration) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
            duration,
            parsed: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Value at a dotted path (`data.id`, `data.items.0`), `None` when the
    /// body is not JSON or the path does not resolve.
    #[must_use]
    pub fn json(&self, path: &str) -> Option<&Value> {
        let root = self
            .parsed
            .get_or_init(|| serde_json::from_slice(&self.body).ok())
            .as_ref()?;
        lookup_path(root, path)
    }

    #[must_use]
    pub fn json_str(&self, path: &str) -> Option<&str> {
        self.json(path).and_then(Value::as_str)
    }

    /// Statuses outside 2xx/3xx count as failed requests.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.status < 200 || self.status >= 400
    }
}

/// Sends one request and waits for the complete response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when no response could be obtained (connect failure,
    /// timeout, truncated body). HTTP error statuses are not errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
