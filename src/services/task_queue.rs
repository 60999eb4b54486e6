//! Task queue service: submission, status lookup, cancellation.
//!
//! The queue is the single point of truth for task identity: the Uuid is
//! minted here at submission and never reassigned. Admission (rate limit,
//! execution quota) happens upstream in the middleware chain and is not
//! re-validated here.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Task, TaskPriority, TaskStatus, TaskStatusReport};
use crate::domain::ports::TaskRepository;

pub struct TaskQueueService {
    repo: Arc<dyn TaskRepository>,
    work_tx: mpsc::Sender<Uuid>,
}

impl TaskQueueService {
    pub fn new(repo: Arc<dyn TaskRepository>, work_tx: mpsc::Sender<Uuid>) -> Self {
        Self { repo, work_tx }
    }

    /// Submit an admitted execution request. Inserts the registry row with
    /// status `queued` and hands the id to the worker pool; returns
    /// immediately without waiting for execution to start.
    #[instrument(skip(self, code), fields(owner = %owner, dataset_id = %dataset_id), err)]
    pub async fn submit(
        &self,
        owner: &str,
        dataset_id: &str,
        code: &str,
        timeout_secs: u32,
        priority: TaskPriority,
    ) -> DomainResult<Task> {
        let task = Task::new(owner, dataset_id, code, timeout_secs, priority);
        task.validate().map_err(DomainError::Validation)?;

        self.repo.create(&task).await?;

        if self.work_tx.send(task.id).await.is_err() {
            // Pool shut down; the row stays queued and is picked up on restart.
            warn!(task_id = %task.id, "worker pool unavailable, task left queued");
        }

        info!(task_id = %task.id, "task submitted");
        Ok(task)
    }

    /// Current status payload for a task.
    pub async fn get_status(&self, id: Uuid) -> DomainResult<TaskStatusReport> {
        let task = self.repo.get(id).await?;
        Ok(TaskStatusReport::from(&task))
    }

    /// Owner of a task, for authorization checks at the API boundary.
    pub async fn get_owner(&self, id: Uuid) -> DomainResult<String> {
        Ok(self.repo.get(id).await?.owner)
    }

    /// Cancel a task. Returns `true` only when the task was in a
    /// cancellable state and the cancellation was durably recorded;
    /// `false` for terminal or unknown tasks. Never errors on repeat
    /// calls. Ownership is enforced by the caller.
    #[instrument(skip(self), err)]
    pub async fn cancel(&self, id: Uuid) -> DomainResult<bool> {
        loop {
            let mut task = match self.repo.get(id).await {
                Ok(task) => task,
                Err(DomainError::TaskNotFound(_)) => return Ok(false),
                Err(err) => return Err(err),
            };

            if !task.status.is_cancellable() {
                return Ok(false);
            }

            let expected = task.version;
            task.transition_to(TaskStatus::Cancelled)
                .map_err(DomainError::Validation)?;

            match self.repo.update(&task, expected).await {
                Ok(()) => {
                    info!(task_id = %id, "task cancelled");
                    return Ok(true);
                }
                // Lost the compare-and-set to the lifecycle driver;
                // re-read and re-decide.
                Err(DomainError::ConcurrencyConflict(_)) => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// A principal's tasks, newest first.
    pub async fn list_for_owner(&self, owner: &str) -> DomainResult<Vec<Task>> {
        self.repo.list_by_owner(owner).await
    }

    /// Aggregate counts per status, for the admin queue-status view.
    pub async fn queue_stats(&self) -> DomainResult<HashMap<TaskStatus, i64>> {
        self.repo.count_by_status().await
    }
}
