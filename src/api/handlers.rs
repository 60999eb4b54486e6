//! HTTP handlers for the execution pipeline.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::domain::models::{Principal, TaskPriority, TaskStatus, TaskStatusReport};
use crate::services::{authorize, quota};

/// Body of `POST /execute`.
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub dataset_id: String,
    pub code: String,
    #[serde(default)]
    pub timeout: Option<u32>,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub task_id: Uuid,
    pub status: TaskStatus,
    pub message: String,
}

/// `POST /execute`: submit code for asynchronous execution.
pub async fn execute_code(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<ExecuteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.dataset_id.is_empty() {
        return Err(ApiError::BadRequest("dataset_id is required".to_string()));
    }
    if request.code.trim().is_empty() {
        return Err(ApiError::BadRequest("code is required".to_string()));
    }

    let dataset = state.datasets.get(&request.dataset_id).await?;
    if !authorize(&principal, &dataset.owner) {
        return Err(ApiError::Forbidden(
            "You don't have access to this dataset".to_string(),
        ));
    }

    // Single-task timeout bound: the user's request clamped to their
    // effective cap.
    let cap = u32::try_from(quota::effective_limit(
        principal.quota.as_deref(),
        quota::MAX_EXECUTION_TIME,
        i64::from(state.execution.container_timeout_secs),
    ))
    .unwrap_or(state.execution.container_timeout_secs);
    let timeout_secs = quota::effective_timeout(request.timeout, cap);

    let priority = request
        .priority
        .as_deref()
        .and_then(TaskPriority::from_str)
        .unwrap_or_default();

    let task = state
        .queue
        .submit(&principal.id, &request.dataset_id, &request.code, timeout_secs, priority)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ExecuteResponse {
            task_id: task.id,
            status: task.status,
            message: "Code submitted for execution".to_string(),
        }),
    ))
}

/// `GET /tasks/{task_id}`: current status of a task.
pub async fn get_task_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatusReport>, ApiError> {
    let task_id = parse_task_id(&task_id)?;
    let owner = state.queue.get_owner(task_id).await?;
    if !authorize(&principal, &owner) {
        return Err(ApiError::Forbidden(
            "You don't have permission to view this task".to_string(),
        ));
    }

    Ok(Json(state.queue.get_status(task_id).await?))
}

/// `DELETE /tasks/{task_id}`: attempt cancellation.
pub async fn cancel_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(task_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = parse_task_id(&task_id)?;
    let owner = state.queue.get_owner(task_id).await?;
    if !authorize(&principal, &owner) {
        return Err(ApiError::Forbidden(
            "You don't have permission to cancel this task".to_string(),
        ));
    }

    if state.queue.cancel(task_id).await? {
        Ok(Json(json!({
            "status": "cancelled",
            "message": "Task has been cancelled"
        })))
    } else {
        Err(ApiError::BadRequest(
            "Failed to cancel task: task may have completed or doesn't exist".to_string(),
        ))
    }
}

/// `GET /executions`: the caller's tasks, newest first.
pub async fn list_executions(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<TaskStatusReport>>, ApiError> {
    let tasks = state.queue.list_for_owner(&principal.id).await?;
    Ok(Json(tasks.iter().map(TaskStatusReport::from).collect()))
}

/// `GET /admin/queue-status`: aggregate counts per status. Admin only.
pub async fn queue_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    if !principal.is_admin() {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let counts = state.queue.queue_stats().await?;
    let count = |status: TaskStatus| counts.get(&status).copied().unwrap_or(0);

    Ok(Json(json!({
        "queued": count(TaskStatus::Queued),
        "running": count(TaskStatus::Running),
        "completed": count(TaskStatus::Completed),
        "failed": count(TaskStatus::Failed),
        "cancelled": count(TaskStatus::Cancelled),
    })))
}

/// `GET /health`: liveness probe, no auth.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Task not found".to_string()))
}
