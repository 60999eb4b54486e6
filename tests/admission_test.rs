//! Tests for the admission gates: the per-identity request rate limit and
//! the per-identity daily execution quota, including per-user overrides.

mod common;

use axum::http::{Method, StatusCode};

use common::{request, spawn_app, submit, ALICE, BOB, BROKEN_QUOTA, CAPPED};
use deepsandbox::domain::models::AdmissionConfig;

fn admission(max_requests_per_window: i64, max_executions_per_day: i64) -> AdmissionConfig {
    AdmissionConfig {
        rate_limit_window_secs: 60,
        max_requests_per_window,
        max_executions_per_day,
    }
}

async fn list_executions(app: &common::TestApp, token: &str) -> (StatusCode, serde_json::Value) {
    request(
        &app.router,
        Method::GET,
        "/api/v1/executions",
        Some(token),
        None,
    )
    .await
}

#[tokio::test]
async fn rate_limit_rejects_after_window_limit() {
    let app = spawn_app(admission(3, 10_000)).await;

    for _ in 0..3 {
        let (status, _) = list_executions(&app, ALICE).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = list_executions(&app, ALICE).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests. Please try again later.");
}

#[tokio::test]
async fn rate_limit_counts_each_identity_separately() {
    let app = spawn_app(admission(2, 10_000)).await;

    for _ in 0..2 {
        let (status, _) = list_executions(&app, ALICE).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = list_executions(&app, ALICE).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // An exhausted window for one identity never spills onto another.
    let (status, _) = list_executions(&app, BOB).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn rate_limit_runs_before_authentication() {
    let app = spawn_app(admission(2, 10_000)).await;

    // Unauthenticated requests count against a network-origin identity
    // and are rejected with 429, not 401, once over the limit.
    for _ in 0..2 {
        let (status, _) = request(&app.router, Method::GET, "/api/v1/executions", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, _) = request(&app.router, Method::GET, "/api/v1/executions", None, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn daily_quota_rejects_submission_over_limit() {
    let app = spawn_app(admission(10_000, 2)).await;

    for _ in 0..2 {
        let (status, _) = submit(&app.router, ALICE, "ds-alice").await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    let (status, body) = submit(&app.router, ALICE, "ds-alice").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "You have exceeded your daily execution quota");
}

#[tokio::test]
async fn quota_blob_overrides_the_system_default() {
    // System default is generous; the capped user's blob allows 2 per day.
    let app = spawn_app(admission(10_000, 10_000)).await;

    for _ in 0..2 {
        let (status, _) = submit(&app.router, CAPPED, "ds-carol").await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }
    let (status, _) = submit(&app.router, CAPPED, "ds-carol").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Users without an override stay on the system default.
    for _ in 0..3 {
        let (status, _) = submit(&app.router, ALICE, "ds-alice").await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }
}

#[tokio::test]
async fn malformed_quota_blob_falls_back_to_default() {
    let app = spawn_app(admission(10_000, 2)).await;

    for _ in 0..2 {
        let (status, _) = submit(&app.router, BROKEN_QUOTA, "ds-dave").await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }
    let (status, _) = submit(&app.router, BROKEN_QUOTA, "ds-dave").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn rejected_submission_creates_no_task() {
    let app = spawn_app(admission(10_000, 1)).await;

    let (status, _) = submit(&app.router, ALICE, "ds-alice").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (status, _) = submit(&app.router, ALICE, "ds-alice").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, body) = list_executions(&app, ALICE).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn quota_gates_only_the_execution_route() {
    let app = spawn_app(admission(10_000, 1)).await;

    let (status, _) = submit(&app.router, ALICE, "ds-alice").await;
    assert_eq!(status, StatusCode::ACCEPTED);

    // Status and listing stay available after the daily quota is spent.
    for _ in 0..5 {
        let (status, _) = list_executions(&app, ALICE).await;
        assert_eq!(status, StatusCode::OK);
    }
}
