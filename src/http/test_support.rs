use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::error::TransportError;

use super::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// One request as the mock saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Exchange {
    pub method: HttpMethod,
    /// Path below `/api/`, e.g. `roles/3`.
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct RoleStore {
    next_id: u64,
    roles: BTreeMap<u64, String>,
    exchanges: Vec<Exchange>,
}

/// In-memory role API with fixed latency.
pub(crate) struct MockRoleApi {
    latency: Duration,
    create_status: u16,
    fail_creates: bool,
    login_token: Option<String>,
    store: Mutex<RoleStore>,
}

impl MockRoleApi {
    pub(crate) fn new(latency: Duration) -> Self {
        Self {
            latency,
            create_status: 201,
            fail_creates: false,
            login_token: None,
            store: Mutex::new(RoleStore::default()),
        }
    }

    pub(crate) const fn with_create_status(mut self, status: u16) -> Self {
        self.create_status = status;
        self
    }

    pub(crate) const fn failing_creates(mut self) -> Self {
        self.fail_creates = true;
        self
    }

    pub(crate) fn with_login_token(mut self, token: &str) -> Self {
        self.login_token = Some(token.to_owned());
        self
    }

    pub(crate) fn exchanges(&self) -> Vec<Exchange> {
        self.store.lock().exchanges.clone()
    }

    pub(crate) fn count(&self, method: HttpMethod, path_prefix: &str) -> usize {
        self.store
            .lock()
            .exchanges
            .iter()
            .filter(|exchange| exchange.method == method && exchange.path.starts_with(path_prefix))
            .count()
    }

    pub(crate) fn live_roles(&self) -> usize {
        self.store.lock().roles.len()
    }

    fn respond(&self, method: HttpMethod, path: &str, body: Option<&[u8]>) -> Result<(u16, Value), TransportError> {
        let name = body
            .and_then(|bytes| serde_json::from_slice::<Value>(bytes).ok())
            .and_then(|value| value.get("name").and_then(Value::as_str).map(str::to_owned))
            .unwrap_or_default();
        let mut store = self.store.lock();
        let role_id = path
            .strip_prefix("roles/")
            .and_then(|id| id.parse::<u64>().ok());
        let response = match (method, path, role_id) {
            (HttpMethod::Post, "auth/login", _) => match &self.login_token {
                Some(token) => (200, json!({ "data": { "token": token } })),
                None => (401, json!({ "message": "Unauthorized" })),
            },
            (HttpMethod::Post, "roles", _) => {
                if self.fail_creates {
                    return Err(TransportError::Connect {
                        message: "connection refused".to_owned(),
                    });
                }
                store.next_id = store.next_id.saturating_add(1);
                let id = store.next_id;
                store.roles.insert(id, name.clone());
                (
                    self.create_status,
                    json!({ "message": "Success", "data": { "id": id, "name": name } }),
                )
            }
            (HttpMethod::Get, "roles", _) => {
                let roles: Vec<Value> = store
                    .roles
                    .iter()
                    .map(|(id, name)| json!({ "id": id, "name": name }))
                    .collect();
                (200, json!({ "data": roles }))
            }
            (HttpMethod::Get, _, Some(id)) => match store.roles.get(&id) {
                Some(name) => (200, json!({ "data": { "id": id, "name": name } })),
                None => (404, json!({ "message": "Role not found" })),
            },
            (HttpMethod::Put, _, Some(id)) => match store.roles.get_mut(&id) {
                Some(existing) => {
                    *existing = name;
                    (200, json!({ "message": "Success" }))
                }
                None => (404, json!({ "message": "Role not found" })),
            },
            (HttpMethod::Delete, _, Some(id)) => match store.roles.remove(&id) {
                Some(_) => (200, json!({ "message": "Role deleted successfully" })),
                None => (404, json!({ "message": "Role not found" })),
            },
            _ => (404, json!({ "message": "Not found" })),
        };
        Ok(response)
    }
}

#[async_trait]
impl Transport for MockRoleApi {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let path = request
            .url
            .split_once("/api/")
            .map(|(_, path)| path.to_owned())
            .unwrap_or_default();
        let authorization = request
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .map(|(_, value)| value.clone());
        self.store.lock().exchanges.push(Exchange {
            method: request.method,
            path: path.clone(),
            authorization,
        });
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let (status, body) = self.respond(request.method, &path, request.body.as_deref())?;
        let bytes = serde_json::to_vec(&body).map_err(|err| TransportError::Body {
            message: err.to_string(),
        })?;
        Ok(HttpResponse::new(status, bytes, self.latency))
    }
}
