//! Mapping of domain errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::domain::errors::{AdmissionScope, DomainError};

/// API-boundary error. Every variant renders as a short JSON body with the
/// corresponding status code; nothing here is fatal to the process.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    TooManyRequests(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &str) {
        match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.parts();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(%message, "internal error at request boundary");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::BadRequest(msg),
            DomainError::TaskNotFound(_) => Self::NotFound("Task not found".to_string()),
            DomainError::DatasetNotFound(_) => Self::NotFound("Dataset not found".to_string()),
            DomainError::AdmissionRejected { scope } => match scope {
                AdmissionScope::RateLimit => Self::TooManyRequests(
                    "Too many requests. Please try again later.".to_string(),
                ),
                AdmissionScope::ExecutionQuota => Self::TooManyRequests(
                    "You have exceeded your daily execution quota".to_string(),
                ),
            },
            DomainError::Conflict(id) => Self::Conflict(format!("Task already exists: {id}")),
            DomainError::ConcurrencyConflict(_)
            | DomainError::Database(_)
            | DomainError::Serialization(_) => Self::Internal(err.to_string()),
        }
    }
}
