//! HTTP surface: router assembly and shared application state.

pub mod error;
pub mod handlers;
pub mod middleware;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::domain::models::{AdmissionConfig, ExecutionConfig};
use crate::domain::ports::{CounterStore, DatasetCatalog, IdentityProvider};
use crate::services::TaskQueueService;

pub use error::ApiError;

/// Shared state handed to handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<TaskQueueService>,
    pub counters: Arc<dyn CounterStore>,
    pub datasets: Arc<dyn DatasetCatalog>,
    pub identities: Arc<dyn IdentityProvider>,
    pub admission: AdmissionConfig,
    pub execution: ExecutionConfig,
}

/// Build the versioned API router.
///
/// Middleware ordering per route: rate limiter first, then
/// authentication, then (execution route only) the daily quota gate.
pub fn build_router(state: AppState) -> Router {
    let execute = Router::new()
        .route("/execute", post(handlers::execute_code))
        .route_layer(from_fn_with_state(state.clone(), middleware::execution_quota));

    let api = Router::new()
        .merge(execute)
        .route(
            "/tasks/:task_id",
            get(handlers::get_task_status).delete(handlers::cancel_task),
        )
        .route("/executions", get(handlers::list_executions))
        .route("/admin/queue-status", get(handlers::queue_status))
        .route_layer(from_fn_with_state(state.clone(), middleware::authenticate))
        .route_layer(from_fn_with_state(state.clone(), middleware::rate_limit));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(handlers::health))
        .with_state(state)
}
