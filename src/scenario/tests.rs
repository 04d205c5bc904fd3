use super::roles::{
    CREATE_MESSAGE_CHECK, CREATE_STATUS_CHECK, DELETE_MESSAGE_CHECK, Gate, IterationState,
    LIST_ARRAY_CHECK, READ_DATA_CHECK, RoleId, RoleStep, UPDATE_STATUS_CHECK,
};
use super::*;
use crate::app::SetupData;
use crate::http::{HttpMethod, HttpResponse, MockRoleApi, Transport};
use crate::metrics::{CheckSummary, MetricsAggregator};
use crate::vu::{RunContext, VuContext};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

fn response(status: u16, body: &Value) -> Result<HttpResponse, String> {
    let bytes = serde_json::to_vec(body).map_err(|err| format!("encode failed: {}", err))?;
    Ok(HttpResponse::new(status, bytes, Duration::ZERO))
}

fn context(api: &Arc<MockRoleApi>) -> (VuContext, Arc<MetricsAggregator>) {
    let metrics = Arc::new(MetricsAggregator::default());
    let transport: Arc<dyn Transport> = Arc::<MockRoleApi>::clone(api);
    let run = Arc::new(RunContext {
        base_url: "http://roles.test".to_owned(),
        transport,
        metrics: Arc::clone(&metrics),
        setup: SetupData::default(),
        headers: Vec::new(),
        pause: Duration::ZERO,
        scenario: "roles",
    });
    (VuContext::new(1, run), metrics)
}

fn check<'a>(checks: &'a [CheckSummary], name: &str) -> Option<&'a CheckSummary> {
    checks.iter().find(|summary| summary.name == name)
}

#[test]
fn steps_needing_a_role_are_gated_until_create_succeeds() -> Result<(), String> {
    let mut state = IterationState::default();
    for step in RoleStep::ALL {
        let expected = if step.requires_role() {
            Gate::Skip
        } else {
            Gate::Run
        };
        if step.gate(&state) != expected {
            return Err(format!("Unexpected gate for {} without a role", step.name()));
        }
    }

    state.absorb_create(&response(
        201,
        &json!({"message": "Success", "data": {"id": 42}}),
    )?);
    if state.role_id().map(RoleId::as_str) != Some("42") {
        return Err(format!("Expected id 42, got {:?}", state.role_id()));
    }
    if RoleStep::ALL.iter().any(|step| step.gate(&state) == Gate::Skip) {
        return Err("Expected every step to run once an id is known".to_owned());
    }
    Ok(())
}

#[test]
fn create_id_is_kept_only_from_201() -> Result<(), String> {
    let body = json!({"message": "Success", "data": {"id": 5}});
    for status in [200, 204, 400, 500] {
        let mut state = IterationState::default();
        state.absorb_create(&response(status, &body)?);
        if state.role_id().is_some() {
            return Err(format!("Status {} must not retain an id", status));
        }
    }
    Ok(())
}

#[test]
fn role_id_treats_zero_empty_and_null_as_absent() -> Result<(), String> {
    let absent = [
        json!(0),
        json!(0.0),
        json!(""),
        json!(null),
        json!(false),
        json!([]),
        json!({}),
    ];
    for value in absent {
        if RoleId::from_json(&value).is_some() {
            return Err(format!("Expected {} to be absent", value));
        }
    }
    let present = [(json!(7), "7"), (json!("abc-1"), "abc-1"), (json!(-3), "-3")];
    for (value, expected) in present {
        let id = RoleId::from_json(&value).ok_or_else(|| format!("Expected id for {}", value))?;
        if id.to_string() != expected {
            return Err(format!("Expected {}, got {}", expected, id));
        }
    }
    Ok(())
}

#[test]
fn random_string_uses_lowercase_alphanumerics() -> Result<(), String> {
    let value = random_string(64);
    if value.len() != 64 {
        return Err(format!("Expected 64 chars, got {}", value.len()));
    }
    if !value
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
    {
        return Err(format!("Unexpected characters in {}", value));
    }
    if !random_string(0).is_empty() {
        return Err("Expected empty string for zero length".to_owned());
    }
    Ok(())
}

#[test]
fn role_payload_prefixes_random_suffix() -> Result<(), String> {
    let payload = role_payload("Test Role");
    let name = payload
        .get("name")
        .and_then(Value::as_str)
        .ok_or("Missing name")?;
    let suffix = name
        .strip_prefix("Test Role ")
        .ok_or_else(|| format!("Unexpected name {}", name))?;
    if suffix.len() != 8 {
        return Err(format!("Expected 8-char suffix, got {}", suffix));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn iteration_walks_full_crud_cycle() -> Result<(), String> {
    let api = Arc::new(MockRoleApi::new(Duration::from_millis(5)));
    let (ctx, metrics) = context(&api);
    RoleWorkflow::new().run_iteration(&ctx).await;

    let methods: Vec<(HttpMethod, String)> = api
        .exchanges()
        .into_iter()
        .map(|exchange| (exchange.method, exchange.path))
        .collect();
    let expected = vec![
        (HttpMethod::Post, "roles".to_owned()),
        (HttpMethod::Get, "roles".to_owned()),
        (HttpMethod::Get, "roles/1".to_owned()),
        (HttpMethod::Put, "roles/1".to_owned()),
        (HttpMethod::Delete, "roles/1".to_owned()),
    ];
    if methods != expected {
        return Err(format!("Unexpected exchanges: {:?}", methods));
    }
    if api.live_roles() != 0 {
        return Err("Expected the created role to be deleted".to_owned());
    }
    let checks = metrics.checks();
    if checks.len() != 10 || checks.iter().any(|summary| summary.fails != 0) {
        return Err(format!("Expected ten passing checks, got {:?}", checks));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_create_skips_dependent_steps() -> Result<(), String> {
    let api = Arc::new(MockRoleApi::new(Duration::from_millis(5)).with_create_status(500));
    let (ctx, metrics) = context(&api);
    RoleWorkflow::new().run_iteration(&ctx).await;

    if api.exchanges().len() != 2 {
        return Err(format!("Expected create and list only, got {:?}", api.exchanges()));
    }
    let checks = metrics.checks();
    let create = check(&checks, CREATE_STATUS_CHECK).ok_or("Missing create status check")?;
    if create.fails != 1 {
        return Err("Expected create status check to fail".to_owned());
    }
    if check(&checks, LIST_ARRAY_CHECK).is_none_or(|summary| summary.passes != 1) {
        return Err("Expected list check to pass".to_owned());
    }
    for skipped in [READ_DATA_CHECK, UPDATE_STATUS_CHECK, DELETE_MESSAGE_CHECK] {
        if check(&checks, skipped).is_some() {
            return Err(format!("Check {} should not have run", skipped));
        }
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn transport_error_fails_create_checks() -> Result<(), String> {
    let api = Arc::new(MockRoleApi::new(Duration::from_millis(5)).failing_creates());
    let (ctx, metrics) = context(&api);
    RoleWorkflow::new().run_iteration(&ctx).await;

    let checks = metrics.checks();
    for name in [CREATE_STATUS_CHECK, CREATE_MESSAGE_CHECK] {
        if check(&checks, name).is_none_or(|summary| summary.fails != 1) {
            return Err(format!("Expected {} to fail once", name));
        }
    }
    if api.count(HttpMethod::Get, "roles/") != 0 {
        return Err("Expected no read after a failed create".to_owned());
    }
    let failed = metrics.snapshot_named("http_req_failed");
    if failed.hits != 1 || failed.count != 2 {
        return Err(format!(
            "Expected one failed of two requests, got {} of {}",
            failed.hits, failed.count
        ));
    }
    Ok(())
}

#[test]
fn workflow_lists_steps_in_order() -> Result<(), String> {
    let steps = RoleWorkflow::new().steps();
    if steps != ["create", "list", "read", "update", "delete"] {
        return Err(format!("Unexpected steps {:?}", steps));
    }
    Ok(())
}
