//! Domain errors for the DeepSandbox execution pipeline.

use thiserror::Error;
use uuid::Uuid;

/// Which admission gate rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionScope {
    /// Per-identity request rate limit.
    RateLimit,
    /// Per-identity daily execution quota.
    ExecutionQuota,
}

impl AdmissionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimit => "rate_limit",
            Self::ExecutionQuota => "execution_quota",
        }
    }
}

/// Domain-level errors surfaced by the task pipeline.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Admission rejected ({})", .scope.as_str())]
    AdmissionRejected { scope: AdmissionScope },

    #[error("Task already exists: {0}")]
    Conflict(Uuid),

    #[error("Concurrency conflict: task {0} was modified")]
    ConcurrencyConflict(Uuid),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
