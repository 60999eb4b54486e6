use crate::domain::errors::DomainResult;
use crate::domain::models::{Task, TaskStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// Repository port for task persistence.
///
/// The store is shared by request handlers and lifecycle workers; `update`
/// is a compare-and-set on the task's version field so a cancel racing a
/// completion write loses cleanly instead of being overwritten.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new task. Fails with `DomainError::Conflict` when the id
    /// already exists.
    async fn create(&self, task: &Task) -> DomainResult<()>;

    /// Get a task by id. Fails with `DomainError::TaskNotFound` when absent.
    async fn get(&self, id: Uuid) -> DomainResult<Task>;

    /// Full-record overwrite, guarded by `expected_version`. Fails with
    /// `DomainError::ConcurrencyConflict` when the stored version moved.
    async fn update(&self, task: &Task, expected_version: i64) -> DomainResult<()>;

    /// List a principal's tasks, newest first.
    async fn list_by_owner(&self, owner: &str) -> DomainResult<Vec<Task>>;

    /// Aggregate task counts per status.
    async fn count_by_status(&self) -> DomainResult<HashMap<TaskStatus, i64>>;
}
