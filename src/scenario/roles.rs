//! Role management CRUD workflow: create, list, read, update, delete.
//!
//! Steps 3 to 5 operate on the role created in step 1 of the same iteration
//! and are skipped when no id was obtained. Every step, skipped or not, is
//! followed by the configured pause.
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::checks::Check;
use crate::http::{HttpMethod, HttpResponse};
use crate::vu::VuContext;

use super::{Workflow, role_payload};

pub const ROLES_PATH: &str = "/api/roles";

pub const CREATE_STATUS_CHECK: &str = "Create role status is 201";
pub const CREATE_MESSAGE_CHECK: &str = "Create response has success message";
pub const LIST_STATUS_CHECK: &str = "Get all roles status is 200";
pub const LIST_ARRAY_CHECK: &str = "Get all roles returns array";
pub const READ_STATUS_CHECK: &str = "Get role by ID status is 200";
pub const READ_DATA_CHECK: &str = "Get role by ID returns correct data";
pub const UPDATE_STATUS_CHECK: &str = "Update role status is 200";
pub const UPDATE_MESSAGE_CHECK: &str = "Update response has success message";
pub const DELETE_STATUS_CHECK: &str = "Delete role status is 200";
pub const DELETE_MESSAGE_CHECK: &str = "Delete response has success message";

const SUCCESS_MESSAGE: &str = "Success";
const DELETED_MESSAGE: &str = "Role deleted successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleStep {
    Create,
    List,
    Read,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Run,
    Skip,
}

impl RoleStep {
    pub const ALL: [RoleStep; 5] = [
        RoleStep::Create,
        RoleStep::List,
        RoleStep::Read,
        RoleStep::Update,
        RoleStep::Delete,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            RoleStep::Create => "create",
            RoleStep::List => "list",
            RoleStep::Read => "read",
            RoleStep::Update => "update",
            RoleStep::Delete => "delete",
        }
    }

    #[must_use]
    pub const fn requires_role(self) -> bool {
        matches!(self, RoleStep::Read | RoleStep::Update | RoleStep::Delete)
    }

    #[must_use]
    pub const fn gate(self, state: &IterationState) -> Gate {
        if self.requires_role() && state.role_id.is_none() {
            Gate::Skip
        } else {
            Gate::Run
        }
    }
}

/// Identifier of a role created during the current iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleId(String);

impl RoleId {
    /// Accepts numbers and strings. `0`, `""` and `null` count as absent.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => {
                let is_zero = number
                    .as_f64()
                    .is_some_and(|float| float.abs() < f64::MIN_POSITIVE);
                (!is_zero).then(|| RoleId(number.to_string()))
            }
            Value::String(text) if !text.is_empty() => Some(RoleId(text.clone())),
            Value::String(_) | Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
                None
            }
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State private to one iteration of one virtual user.
#[derive(Debug, Default)]
pub struct IterationState {
    role_id: Option<RoleId>,
}

impl IterationState {
    #[must_use]
    pub const fn role_id(&self) -> Option<&RoleId> {
        self.role_id.as_ref()
    }

    /// Retains the id from a create response; only a 201 counts.
    pub fn absorb_create(&mut self, response: &HttpResponse) {
        if response.status == 201 {
            self.role_id = response.json("data.id").and_then(RoleId::from_json);
        }
    }
}

fn has_message(response: &HttpResponse, expected: &str) -> bool {
    response.json_str("message") == Some(expected)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RoleWorkflow;

impl RoleWorkflow {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    async fn run_step(&self, step: RoleStep, ctx: &VuContext, state: &mut IterationState) {
        let name = step.name();
        match step {
            RoleStep::Create => {
                let body = role_payload("Test Role");
                let response = ctx
                    .request(name, HttpMethod::Post, ROLES_PATH, Some(&body))
                    .await;
                ctx.check_all(
                    name,
                    &response,
                    &[
                        Check::new(CREATE_STATUS_CHECK, &|r: &HttpResponse| r.status == 201),
                        Check::new(CREATE_MESSAGE_CHECK, &|r: &HttpResponse| {
                            has_message(r, SUCCESS_MESSAGE)
                        }),
                    ],
                );
                state.absorb_create(&response);
            }
            RoleStep::List => {
                let response = ctx.request(name, HttpMethod::Get, ROLES_PATH, None).await;
                ctx.check_all(
                    name,
                    &response,
                    &[
                        Check::new(LIST_STATUS_CHECK, &|r: &HttpResponse| r.status == 200),
                        Check::new(LIST_ARRAY_CHECK, &|r: &HttpResponse| {
                            r.json("data").is_some_and(Value::is_array)
                        }),
                    ],
                );
            }
            RoleStep::Read | RoleStep::Update | RoleStep::Delete => {
                let Some(id) = state.role_id() else {
                    return;
                };
                let path = format!("{}/{}", ROLES_PATH, id);
                self.run_by_id(step, ctx, &path).await;
            }
        }
    }

    async fn run_by_id(&self, step: RoleStep, ctx: &VuContext, path: &str) {
        let name = step.name();
        match step {
            RoleStep::Read => {
                let response = ctx.request(name, HttpMethod::Get, path, None).await;
                ctx.check_all(
                    name,
                    &response,
                    &[
                        Check::new(READ_STATUS_CHECK, &|r: &HttpResponse| r.status == 200),
                        Check::new(READ_DATA_CHECK, &|r: &HttpResponse| {
                            r.json("data").is_some_and(|data| !data.is_null())
                        }),
                    ],
                );
            }
            RoleStep::Update => {
                let body = role_payload("Updated Role");
                let response = ctx.request(name, HttpMethod::Put, path, Some(&body)).await;
                ctx.check_all(
                    name,
                    &response,
                    &[
                        Check::new(UPDATE_STATUS_CHECK, &|r: &HttpResponse| r.status == 200),
                        Check::new(UPDATE_MESSAGE_CHECK, &|r: &HttpResponse| {
                            has_message(r, SUCCESS_MESSAGE)
                        }),
                    ],
                );
            }
            RoleStep::Delete => {
                let response = ctx.request(name, HttpMethod::Delete, path, None).await;
                ctx.check_all(
                    name,
                    &response,
                    &[
                        Check::new(DELETE_STATUS_CHECK, &|r: &HttpResponse| r.status == 200),
                        Check::new(DELETE_MESSAGE_CHECK, &|r: &HttpResponse| {
                            has_message(r, DELETED_MESSAGE)
                        }),
                    ],
                );
            }
            RoleStep::Create | RoleStep::List => {}
        }
    }
}

#[async_trait]
impl Workflow for RoleWorkflow {
    fn name(&self) -> &'static str {
        "roles"
    }

    fn steps(&self) -> Vec<&'static str> {
        RoleStep::ALL.iter().map(|step| step.name()).collect()
    }

    async fn run_iteration(&self, ctx: &VuContext) {
        let mut state = IterationState::default();
        for step in RoleStep::ALL {
            match step.gate(&state) {
                Gate::Run => self.run_step(step, ctx, &mut state).await,
                Gate::Skip => debug!("VU {} skipping {}: no role id", ctx.id(), step.name()),
            }
            ctx.pause().await;
        }
    }
}
