//! End-to-end API tests driving the full router in process.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{TestConfig, TestFixture};

// ============================================================================
// Helpers
// ============================================================================

/// Check in a patient and return the created ticket body.
async fn check_in(fixture: &TestFixture, name: &str, priority: &str) -> Value {
    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({
                "patient_name": name,
                "chief_complaint": "cough",
                "priority": priority,
            }),
        )
        .await;
    assert_status!(response, StatusCode::CREATED);
    response.body
}

/// Call the next patient at a station and start the session.
async fn serve(fixture: &TestFixture, station: &str) -> Value {
    let called = fixture
        .post_empty(&format!("/api/v1/stations/{}/call-next", station))
        .await;
    assert_status!(called, StatusCode::OK);
    let id = called.body["id"].as_str().unwrap().to_string();

    let started = fixture
        .post_empty(&format!("/api/v1/tickets/{}/start", id))
        .await;
    assert_status!(started, StatusCode::OK);
    started.body
}

/// Advance an in-session ticket, optionally with a branch destination.
async fn advance(fixture: &TestFixture, id: &str, to: Option<&str>) -> Value {
    let response = match to {
        Some(station) => {
            fixture
                .post(
                    &format!("/api/v1/tickets/{}/advance", id),
                    json!({ "to": station }),
                )
                .await
        }
        None => {
            fixture
                .post_empty(&format!("/api/v1/tickets/{}/advance", id))
                .await
        }
    };
    assert_status!(response, StatusCode::OK);
    response.body
}

// ============================================================================
// Basic endpoints
// ============================================================================

#[tokio::test]
async fn health_endpoint_responds() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn config_endpoint_reports_clinic_settings() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/config").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["clinic"]["diagnostics_enabled"], true);
    assert_eq!(response.body["clinic"]["default_mode"], "linear");
}

#[tokio::test]
async fn metrics_endpoint_responds() {
    let fixture = TestFixture::new();
    let response = fixture.get("/metrics").await;
    assert_status!(response, StatusCode::OK);
}

// ============================================================================
// Check-in and lookup
// ============================================================================

#[tokio::test]
async fn check_in_creates_numbered_ticket() {
    let fixture = TestFixture::new();

    let first = check_in(&fixture, "Ana", "normal").await;
    assert_eq!(first["ticket_number"], "CI-0001");
    assert_eq!(first["station"], "check_in");
    assert_eq!(first["status"], "queued");

    let second = check_in(&fixture, "Ben", "senior").await;
    assert_eq!(second["ticket_number"], "CI-0002");
    assert_eq!(second["priority"], "senior");
}

#[tokio::test]
async fn unknown_ticket_is_not_found() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/tickets/no-such-id").await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_tickets_preserves_arrival_order() {
    let fixture = TestFixture::new();
    check_in(&fixture, "Ana", "normal").await;
    check_in(&fixture, "Ben", "emergency").await;

    let response = fixture.get("/api/v1/tickets").await;
    assert_status!(response, StatusCode::OK);
    let names: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["patient_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ana", "Ben"]);
}

// ============================================================================
// Call-next and lifecycle
// ============================================================================

#[tokio::test]
async fn call_next_on_empty_station_is_no_content() {
    let fixture = TestFixture::new();
    let response = fixture
        .post_empty("/api/v1/stations/triage/call-next")
        .await;
    assert_status!(response, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn emergency_patient_is_called_first() {
    let fixture = TestFixture::new();
    check_in(&fixture, "Ana", "normal").await;
    let urgent = check_in(&fixture, "Ben", "emergency").await;

    let called = fixture
        .post_empty("/api/v1/stations/check_in/call-next")
        .await;
    assert_status!(called, StatusCode::OK);
    assert_eq!(called.body["id"], urgent["id"]);
    assert_eq!(called.body["status"], "ready");
}

#[tokio::test]
async fn full_linear_visit_without_orders() {
    let fixture = TestFixture::new();
    check_in(&fixture, "Ana", "normal").await;

    let ticket = serve(&fixture, "check_in").await;
    let id = ticket["id"].as_str().unwrap().to_string();
    assert_eq!(ticket["status"], "in_session");

    let at_triage = advance(&fixture, &id, None).await;
    assert_eq!(at_triage["station"], "triage");
    assert_eq!(at_triage["status"], "queued");

    serve(&fixture, "triage").await;
    let at_consult = advance(&fixture, &id, None).await;
    assert_eq!(at_consult["station"], "consult");

    serve(&fixture, "consult").await;
    // No open orders, so the ticket stays on the linear path.
    let at_return = advance(&fixture, &id, None).await;
    assert_eq!(at_return["station"], "return_consult");

    serve(&fixture, "return_consult").await;
    let at_billing = advance(&fixture, &id, Some("billing")).await;
    assert_eq!(at_billing["station"], "billing");

    serve(&fixture, "billing").await;
    let done = advance(&fixture, &id, None).await;
    assert_eq!(done["station"], "done");
    assert_eq!(done["status"], "completed");
    assert!(done["completed_at"].is_string());
}

#[tokio::test]
async fn starting_an_uncalled_ticket_is_conflict() {
    let fixture = TestFixture::new();
    let ticket = check_in(&fixture, "Ana", "normal").await;
    let id = ticket["id"].as_str().unwrap();

    let response = fixture
        .post_empty(&format!("/api/v1/tickets/{}/start", id))
        .await;
    assert_status!(response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn branching_to_a_non_branch_station_is_rejected() {
    let fixture = TestFixture::new();
    check_in(&fixture, "Ana", "normal").await;

    let ticket = serve(&fixture, "check_in").await;
    let id = ticket["id"].as_str().unwrap().to_string();

    let response = fixture
        .post(
            &format!("/api/v1/tickets/{}/advance", id),
            json!({ "to": "lab" }),
        )
        .await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn return_consult_branch_must_be_chosen() {
    let fixture = TestFixture::new();
    check_in(&fixture, "Ana", "normal").await;

    let ticket = serve(&fixture, "check_in").await;
    let id = ticket["id"].as_str().unwrap().to_string();
    advance(&fixture, &id, None).await;
    serve(&fixture, "triage").await;
    advance(&fixture, &id, None).await;
    serve(&fixture, "consult").await;
    advance(&fixture, &id, None).await;
    serve(&fixture, "return_consult").await;

    // Pharmacy-vs-Billing is always the operator's call.
    let response = fixture
        .post_empty(&format!("/api/v1/tickets/{}/advance", id))
        .await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn call_next_favors_longest_wait_not_station_entry() {
    let fixture = TestFixture::new();
    let ana = check_in(&fixture, "Ana", "normal").await;
    let ben = check_in(&fixture, "Ben", "normal").await;
    let ana_id = ana["id"].as_str().unwrap().to_string();
    let ben_id = ben["id"].as_str().unwrap().to_string();

    // Ben reaches Triage ahead of Ana despite arriving later.
    serve(&fixture, "check_in").await;
    serve(&fixture, "check_in").await;
    advance(&fixture, &ben_id, None).await;
    advance(&fixture, &ana_id, None).await;

    let called = fixture
        .post_empty("/api/v1/stations/triage/call-next")
        .await;
    assert_eq!(called.body["id"], ana_id.as_str());
}

#[tokio::test]
async fn skip_sends_ticket_behind_later_arrivals() {
    let fixture = TestFixture::new();
    let first = check_in(&fixture, "Ana", "normal").await;
    let second = check_in(&fixture, "Ben", "normal").await;

    let response = fixture
        .post_empty(&format!(
            "/api/v1/tickets/{}/skip",
            first["id"].as_str().unwrap()
        ))
        .await;
    assert_status!(response, StatusCode::OK);

    let called = fixture
        .post_empty("/api/v1/stations/check_in/call-next")
        .await;
    assert_eq!(called.body["id"], second["id"]);
}

#[tokio::test]
async fn no_show_removes_ticket_from_queue() {
    let fixture = TestFixture::new();
    let ticket = check_in(&fixture, "Ana", "normal").await;
    let id = ticket["id"].as_str().unwrap();

    let response = fixture
        .post_empty(&format!("/api/v1/tickets/{}/no-show", id))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "no_show");

    let called = fixture
        .post_empty("/api/v1/stations/check_in/call-next")
        .await;
    assert_status!(called, StatusCode::NO_CONTENT);
}

// ============================================================================
// Diagnostic orders
// ============================================================================

#[tokio::test]
async fn linear_order_phase_runs_sequentially() {
    let fixture = TestFixture::new();
    check_in(&fixture, "Ana", "normal").await;

    serve(&fixture, "check_in").await;
    let ticket = fixture.get("/api/v1/tickets").await.body[0].clone();
    let id = ticket["id"].as_str().unwrap().to_string();
    advance(&fixture, &id, None).await;
    serve(&fixture, "triage").await;
    advance(&fixture, &id, None).await;
    serve(&fixture, "consult").await;

    let with_orders = fixture
        .post(
            &format!("/api/v1/tickets/{}/orders", id),
            json!({ "order_types": ["lab_cbc", "x_ray"] }),
        )
        .await;
    assert_status!(with_orders, StatusCode::OK);
    assert_eq!(with_orders.body["orders"][0]["status"], "pending");
    assert_eq!(with_orders.body["orders"][1]["status"], "pending");

    // Leaving Consult with open orders enters the order phase.
    let in_orders = advance(&fixture, &id, None).await;
    assert_eq!(in_orders["station"], "lab");
    assert_eq!(in_orders["status"], "queued");
    assert_eq!(in_orders["orders"][0]["status"], "queued");
    assert_eq!(in_orders["orders"][1]["status"], "pending");

    serve(&fixture, "lab").await;
    let first_order = in_orders["orders"][0]["id"].as_str().unwrap().to_string();
    let started = fixture
        .post_empty(&format!(
            "/api/v1/tickets/{}/orders/{}/start",
            id, first_order
        ))
        .await;
    assert_status!(started, StatusCode::OK);

    // Completing the cursor order moves the ticket to the next target.
    let after_first = fixture
        .post_empty(&format!("/api/v1/tickets/{}/orders/current/complete", id))
        .await;
    assert_status!(after_first, StatusCode::OK);
    assert_eq!(after_first.body["station"], "imaging");
    assert_eq!(after_first.body["orders"][1]["status"], "queued");

    serve(&fixture, "imaging").await;
    let second_order = after_first.body["orders"][1]["id"]
        .as_str()
        .unwrap()
        .to_string();
    fixture
        .post_empty(&format!(
            "/api/v1/tickets/{}/orders/{}/start",
            id, second_order
        ))
        .await;
    let after_second = fixture
        .post_empty(&format!(
            "/api/v1/tickets/{}/orders/{}/complete",
            id, second_order
        ))
        .await;
    assert_status!(after_second, StatusCode::OK);
    assert_eq!(after_second.body["station"], "return_consult");
}

#[tokio::test]
async fn completing_the_wrong_linear_order_is_conflict() {
    let fixture = TestFixture::new();
    check_in(&fixture, "Ana", "normal").await;

    serve(&fixture, "check_in").await;
    let id = fixture.get("/api/v1/tickets").await.body[0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    advance(&fixture, &id, None).await;
    serve(&fixture, "triage").await;
    advance(&fixture, &id, None).await;
    serve(&fixture, "consult").await;

    let with_orders = fixture
        .post(
            &format!("/api/v1/tickets/{}/orders", id),
            json!({ "order_types": ["lab_cbc", "x_ray"] }),
        )
        .await;
    let second_order = with_orders.body["orders"][1]["id"]
        .as_str()
        .unwrap()
        .to_string();
    advance(&fixture, &id, None).await;

    // The cursor sits on the first order, so the second cannot start.
    let response = fixture
        .post_empty(&format!(
            "/api/v1/tickets/{}/orders/{}/start",
            id, second_order
        ))
        .await;
    assert_status!(response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn orders_are_rejected_when_diagnostics_disabled() {
    let fixture = TestFixture::with_config(TestConfig::without_diagnostics());
    check_in(&fixture, "Ana", "normal").await;

    serve(&fixture, "check_in").await;
    let id = fixture.get("/api/v1/tickets").await.body[0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    advance(&fixture, &id, None).await;
    serve(&fixture, "triage").await;
    advance(&fixture, &id, None).await;
    serve(&fixture, "consult").await;

    let response = fixture
        .post(
            &format!("/api/v1/tickets/{}/orders", id),
            json!({ "order_types": ["lab_cbc"] }),
        )
        .await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn multi_stream_orders_start_independently() {
    let fixture = TestFixture::with_config(TestConfig::multi_stream());
    check_in(&fixture, "Ana", "normal").await;

    serve(&fixture, "check_in").await;
    let id = fixture.get("/api/v1/tickets").await.body[0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    advance(&fixture, &id, None).await;
    serve(&fixture, "triage").await;
    advance(&fixture, &id, None).await;
    serve(&fixture, "consult").await;

    let with_orders = fixture
        .post(
            &format!("/api/v1/tickets/{}/orders", id),
            json!({ "order_types": ["lab_cbc", "x_ray"] }),
        )
        .await;
    // Multi-Stream orders are queued immediately, no cursor gating.
    assert_eq!(with_orders.body["orders"][0]["status"], "queued");
    assert_eq!(with_orders.body["orders"][1]["status"], "queued");

    let second_order = with_orders.body["orders"][1]["id"]
        .as_str()
        .unwrap()
        .to_string();
    let started = fixture
        .post_empty(&format!(
            "/api/v1/tickets/{}/orders/{}/start",
            id, second_order
        ))
        .await;
    assert_status!(started, StatusCode::OK);
    assert_eq!(started.body["orders"][1]["status"], "in_progress");
}

// ============================================================================
// Projections, stats and mode
// ============================================================================

#[tokio::test]
async fn by_station_projection_lists_topology_queues() {
    let fixture = TestFixture::new();
    check_in(&fixture, "Ana", "normal").await;

    let response = fixture.get("/api/v1/queue/by-station").await;
    assert_status!(response, StatusCode::OK);
    let queues = response.body.as_array().unwrap();
    assert_eq!(queues[0]["station"], "check_in");
    assert_eq!(queues[0]["tickets"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn by_section_projection_has_three_sections() {
    let fixture = TestFixture::new();
    check_in(&fixture, "Ana", "normal").await;

    let response = fixture.get("/api/v1/queue/sections").await;
    assert_status!(response, StatusCode::OK);
    let sections: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["section"].as_str().unwrap())
        .collect();
    assert_eq!(sections, vec!["pre_consult", "orders", "post_orders"]);
}

#[tokio::test]
async fn by_order_projection_has_one_column_per_type() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/queue/order-columns").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn stats_track_active_tickets() {
    let fixture = TestFixture::new();
    check_in(&fixture, "Ana", "normal").await;
    check_in(&fixture, "Ben", "normal").await;

    let response = fixture.get("/api/v1/queue/stats").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["active"], 2);
    assert_eq!(response.body["completed_today"], 0);
}

#[tokio::test]
async fn mode_switch_reports_previous_mode() {
    let fixture = TestFixture::new();

    let current = fixture.get("/api/v1/mode").await;
    assert_eq!(current.body["mode"], "linear");

    let switched = fixture
        .put("/api/v1/mode", json!({ "mode": "multi_stream" }))
        .await;
    assert_status!(switched, StatusCode::OK);
    assert_eq!(switched.body["previous"], "linear");
    assert_eq!(switched.body["mode"], "multi_stream");

    let current = fixture.get("/api/v1/mode").await;
    assert_eq!(current.body["mode"], "multi_stream");
}

// ============================================================================
// Audit
// ============================================================================

#[tokio::test]
async fn audit_records_check_in_events() {
    let fixture = TestFixture::new();
    let ticket = check_in(&fixture, "Ana", "emergency").await;
    let id = ticket["id"].as_str().unwrap();

    // The writer drains the channel asynchronously.
    let mut page = Value::Null;
    for _ in 0..50 {
        let response = fixture
            .get(&format!(
                "/api/v1/audit?ticket_id={}&event=patient_checked_in",
                id
            ))
            .await;
        assert_status!(response, StatusCode::OK);
        if response.body["total"].as_i64().unwrap_or(0) > 0 {
            page = response.body;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert_eq!(page["total"], 1);
    assert_eq!(page["records"][0]["event_type"], "patient_checked_in");
    assert_eq!(page["records"][0]["data"]["priority"], "emergency");
}

#[tokio::test]
async fn audit_limit_is_capped() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/audit?limit=99999").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["limit"], 1000);
}
