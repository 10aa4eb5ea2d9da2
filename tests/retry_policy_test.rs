use httpmock::prelude::*;
use profile_switch::domain::model::{
    InputRow, OutcomeStatus, FIELD_CUSTOMER_PROFILE, FIELD_FIRST_NAME, FIELD_LAST_NAME,
    FIELD_MOBILE_PHONE,
};
use profile_switch::domain::ports::{ApiSettings, BatchOptions, NoopProgress, UnauthorizedPolicy};
use profile_switch::{BatchOrchestrator, LeadApi};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio_test::{assert_err, assert_ok};

const RETRY_DELAY: Duration = Duration::from_millis(20);

fn api(server: &MockServer) -> LeadApi {
    let settings = ApiSettings {
        base_url: server.base_url(),
        api_key: "test-key".to_string(),
        request_timeout: Duration::from_secs(5),
        max_attempts: 3,
        retry_delay: RETRY_DELAY,
    };
    assert_ok!(LeadApi::new(&settings))
}

fn options() -> BatchOptions {
    BatchOptions {
        row_delay: Duration::from_millis(1),
        ..BatchOptions::default()
    }
}

fn row(phone: &str, profile: &str) -> InputRow {
    [
        (FIELD_FIRST_NAME, "Jane"),
        (FIELD_LAST_NAME, "Doe"),
        (FIELD_MOBILE_PHONE, phone),
        (FIELD_CUSTOMER_PROFILE, profile),
    ]
    .into_iter()
    .collect()
}

/// 404 不重試，lead id 為空
#[tokio::test]
async fn test_lookup_not_found_is_single_attempt() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET).path("/leads/lookup");
        then.status(404);
    });

    let orchestrator = BatchOrchestrator::new(api(&server), options());
    let report = orchestrator.run(&[row("5551234567", "VIP")], &NoopProgress).await;

    lookup.assert_hits(1);
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert_eq!(outcome.lead_id, "");
    assert_eq!(outcome.error_message, "Lead not found");
}

/// mutate 一直 429：用完重試次數，lead id 仍然保留
#[tokio::test]
async fn test_switch_rate_limited_exhausts_budget() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET).path("/leads/lookup");
        then.status(200).json_body(json!({"id": "abc123"}));
    });
    let switch = server.mock(|when, then| {
        when.method(POST).path("/leads/abc123/switchCustomerProfile");
        then.status(429);
    });

    let orchestrator = BatchOrchestrator::new(api(&server), options());
    let started = Instant::now();
    let report = orchestrator.run(&[row("5551234567", "VIP")], &NoopProgress).await;

    lookup.assert_hits(1);
    switch.assert_hits(3);
    // 兩次 429 退避，每次 2 * RETRY_DELAY
    assert!(started.elapsed() >= RETRY_DELAY * 4);

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert_eq!(outcome.lead_id, "abc123");
    assert_eq!(outcome.error_message, "Rate limited");
}

#[tokio::test]
async fn test_server_error_message_carries_status_and_body() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET).path("/leads/lookup");
        then.status(500).body("upstream exploded");
    });

    let orchestrator = BatchOrchestrator::new(api(&server), options());
    let report = orchestrator.run(&[row("555", "VIP")], &NoopProgress).await;

    lookup.assert_hits(3);
    assert_eq!(report.outcomes[0].error_message, "HTTP 500: upstream exploded");
}

#[tokio::test]
async fn test_invalid_rows_never_touch_transport() {
    let server = MockServer::start();
    let any_call = server.mock(|when, then| {
        when.path_contains("/leads");
        then.status(200).json_body(json!({"id": "x"}));
    });

    let orchestrator = BatchOrchestrator::new(api(&server), options());
    let rows = vec![row("---", "VIP"), row("5551234567", "   ")];
    let report = orchestrator.run(&rows, &NoopProgress).await;

    any_call.assert_hits(0);
    assert_eq!(report.failed, 2);
    assert_eq!(report.outcomes[0].error_message, "Invalid phone number");
    assert_eq!(report.outcomes[1].error_message, "No target profile specified");
}

#[tokio::test]
async fn test_formatted_phone_scenario() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/leads/lookup")
            .query_param("phone", "5551234567");
        then.status(200).json_body(json!({"id": "abc123"}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/leads/abc123/switchCustomerProfile");
        then.status(200).json_body(json!({}));
    });

    let orchestrator = BatchOrchestrator::new(api(&server), options());
    let report = orchestrator
        .run(&[row("(555) 123-4567", "VIP")], &NoopProgress)
        .await;

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.phone, "5551234567");
    assert_eq!(outcome.target_profile, "VIP");
    assert_eq!(outcome.lead_id, "abc123");
    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.error_message, "");
}

#[tokio::test]
async fn test_fail_fast_stops_after_first_unauthorized() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET).path("/leads/lookup");
        then.status(401);
    });

    let orchestrator = BatchOrchestrator::new(
        api(&server),
        BatchOptions {
            unauthorized_policy: UnauthorizedPolicy::FailFast,
            ..options()
        },
    );
    let rows = vec![row("111", "VIP"), row("222", "VIP"), row("333", "VIP")];
    let report = orchestrator.run(&rows, &NoopProgress).await;

    lookup.assert_hits(1);
    assert_eq!(report.total, 3);
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.error_message == "Unauthorized - check your API key"));
}

#[test]
fn test_invalid_base_url_rejected() {
    let settings = ApiSettings::new("not a url", "key");
    assert_err!(LeadApi::new(&settings));
}
