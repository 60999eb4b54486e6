//! Shared fixtures for the API integration tests.
//!
//! Builds the full router over an in-memory database with a static set of
//! principals and seeded datasets, and drives it with `tower::oneshot`.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use deepsandbox::adapters::sqlite::{
    create_test_pool, SqliteCounterStore, SqliteDatasetCatalog, SqliteTaskRepository,
};
use deepsandbox::adapters::{StaticIdentityProvider, StubExecutor};
use deepsandbox::api::{build_router, AppState};
use deepsandbox::domain::models::{AdmissionConfig, ApiKeyConfig, ExecutionConfig};
use deepsandbox::domain::ports::DatasetMeta;
use deepsandbox::services::{ExecutionWorkerPool, TaskQueueService};

/// Regular user `u1`, owns `ds-alice`.
pub const ALICE: &str = "tok-alice";
/// Regular user `u2`, owns `ds-bob`.
pub const BOB: &str = "tok-bob";
/// Admin `a1`, owns nothing.
pub const ADMIN: &str = "tok-admin";
/// User `u3` with a quota blob capping daily executions at 2, owns `ds-carol`.
pub const CAPPED: &str = "tok-capped";
/// User `u4` with a malformed quota blob, owns `ds-dave`.
pub const BROKEN_QUOTA: &str = "tok-broken";

pub struct TestApp {
    pub router: Router,
    // Held so the dispatcher outlives the test.
    _pool: ExecutionWorkerPool,
}

/// Admission limits loose enough to never trip in lifecycle-focused tests.
pub fn generous_admission() -> AdmissionConfig {
    AdmissionConfig {
        rate_limit_window_secs: 60,
        max_requests_per_window: 10_000,
        max_executions_per_day: 10_000,
    }
}

pub async fn spawn_app(admission: AdmissionConfig) -> TestApp {
    spawn_app_with_executor(admission, StubExecutor::new(Duration::from_millis(10))).await
}

pub async fn spawn_app_with_executor(
    admission: AdmissionConfig,
    executor: StubExecutor,
) -> TestApp {
    let pool = create_test_pool().await.expect("test pool");

    let catalog = SqliteDatasetCatalog::new(pool.clone());
    for (id, owner) in [
        ("ds-alice", "u1"),
        ("ds-bob", "u2"),
        ("ds-carol", "u3"),
        ("ds-dave", "u4"),
    ] {
        catalog
            .put(&DatasetMeta {
                id: id.into(),
                owner: owner.into(),
                filename: format!("{id}.csv"),
                size_bytes: 2048,
                created_at: Utc::now(),
            })
            .await
            .expect("seed dataset");
    }

    let repo = Arc::new(SqliteTaskRepository::new(pool.clone()));
    let worker_pool = ExecutionWorkerPool::spawn(repo.clone(), Arc::new(executor), 4, 64);

    let state = AppState {
        queue: Arc::new(TaskQueueService::new(repo, worker_pool.sender())),
        counters: Arc::new(SqliteCounterStore::new(pool.clone())),
        datasets: Arc::new(catalog),
        identities: Arc::new(StaticIdentityProvider::new(&api_keys())),
        admission,
        execution: ExecutionConfig::default(),
    };

    TestApp {
        router: build_router(state),
        _pool: worker_pool,
    }
}

fn api_keys() -> Vec<ApiKeyConfig> {
    fn key(
        token: &str,
        id: &str,
        username: &str,
        roles: &[&str],
        quota: Option<&str>,
    ) -> ApiKeyConfig {
        ApiKeyConfig {
            token: token.into(),
            id: id.into(),
            username: username.into(),
            roles: roles.iter().map(|r| (*r).to_string()).collect(),
            quota: quota.map(str::to_string),
        }
    }

    vec![
        key(ALICE, "u1", "alice", &["user"], None),
        key(BOB, "u2", "bob", &["user"], None),
        key(ADMIN, "a1", "root", &["admin"], None),
        key(
            CAPPED,
            "u3",
            "carol",
            &["user"],
            Some(r#"{"max_executions_per_day": 2}"#),
        ),
        key(BROKEN_QUOTA, "u4", "dave", &["user"], Some("{not json")),
    ]
}

/// Fire one request at the router and return status plus parsed JSON body.
pub async fn request(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

pub async fn submit(router: &Router, token: &str, dataset_id: &str) -> (StatusCode, Value) {
    request(
        router,
        Method::POST,
        "/api/v1/execute",
        Some(token),
        Some(json!({ "dataset_id": dataset_id, "code": "print(1)" })),
    )
    .await
}

pub async fn get_task(router: &Router, token: &str, task_id: &str) -> (StatusCode, Value) {
    request(
        router,
        Method::GET,
        &format!("/api/v1/tasks/{task_id}"),
        Some(token),
        None,
    )
    .await
}

/// Poll a task's status until it reaches a terminal state.
pub async fn wait_for_terminal(router: &Router, token: &str, task_id: &str) -> Value {
    for _ in 0..200 {
        let (status, body) = get_task(router, token, task_id).await;
        assert_eq!(status, StatusCode::OK, "status lookup failed: {body}");
        let state = body["status"].as_str().expect("status field").to_string();
        if matches!(state.as_str(), "completed" | "failed" | "cancelled") {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {task_id} never reached a terminal state");
}
