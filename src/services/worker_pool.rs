//! Execution lifecycle driver.
//!
//! A bounded worker pool drains the submission queue: one dispatcher task
//! receives task ids, acquires a semaphore permit (pool size =
//! `execution_pool_size`), and spawns a run per task. Each run outlives
//! the originating HTTP request.
//!
//! Cancellation is cooperative. Every persisting transition is a
//! compare-and-set against the version read immediately before the write,
//! so a cancel recorded while the executor was running can never be
//! overwritten by `completed` or `failed`.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::models::{Task, TaskStatus};
use crate::domain::ports::{CodeExecutor, TaskRepository};

pub struct ExecutionWorkerPool {
    work_tx: mpsc::Sender<Uuid>,
    dispatcher: JoinHandle<()>,
}

impl ExecutionWorkerPool {
    /// Spawn the dispatcher and return the pool handle.
    pub fn spawn(
        repo: Arc<dyn TaskRepository>,
        executor: Arc<dyn CodeExecutor>,
        pool_size: usize,
        queue_depth: usize,
    ) -> Self {
        let (work_tx, mut work_rx) = mpsc::channel::<Uuid>(queue_depth);
        let permits = Arc::new(Semaphore::new(pool_size));

        let dispatcher = tokio::spawn(async move {
            while let Some(task_id) = work_rx.recv().await {
                let permit = match permits.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    // Semaphore closed only at shutdown.
                    Err(_) => break,
                };
                let repo = repo.clone();
                let executor = executor.clone();
                tokio::spawn(async move {
                    run_task(repo, executor, task_id).await;
                    drop(permit);
                });
            }
            debug!("worker pool dispatcher stopped");
        });

        Self {
            work_tx,
            dispatcher,
        }
    }

    /// Sender feeding the work queue.
    pub fn sender(&self) -> mpsc::Sender<Uuid> {
        self.work_tx.clone()
    }

    /// Stop accepting work and wait for the dispatcher to drain.
    pub async fn shutdown(self) {
        drop(self.work_tx);
        let _ = self.dispatcher.await;
    }
}

/// Drive one task from `queued` to a terminal state.
async fn run_task(repo: Arc<dyn TaskRepository>, executor: Arc<dyn CodeExecutor>, task_id: Uuid) {
    let task = match repo.get(task_id).await {
        Ok(task) => task,
        Err(DomainError::TaskNotFound(_)) => {
            // Row never persisted or already gone; non-fatal.
            debug!(%task_id, "task not found at pickup, skipping");
            return;
        }
        Err(err) => {
            error!(%task_id, %err, "failed to load task at pickup");
            return;
        }
    };

    // A cancel that landed while the task sat in the queue wins here.
    if task.status != TaskStatus::Queued {
        debug!(%task_id, status = task.status.as_str(), "task no longer queued, skipping");
        return;
    }

    let Some(task) = transition(&repo, task, TaskStatus::Running, None, None).await else {
        return;
    };

    info!(%task_id, dataset_id = %task.dataset_id, "execution started");

    let outcome = executor
        .execute(
            &task.dataset_id,
            &task.code,
            Duration::from_secs(u64::from(task.timeout_secs)),
        )
        .await;

    match outcome {
        Ok(output) => {
            if transition(&repo, task, TaskStatus::Completed, Some(output.results), None)
                .await
                .is_some()
            {
                info!(%task_id, "execution completed");
            }
        }
        Err(message) => {
            warn!(%task_id, error = %message, "execution failed");
            let _ = transition(&repo, task, TaskStatus::Failed, None, Some(message)).await;
        }
    }
}

/// Compare-and-set transition. Re-reads on conflict and refuses to
/// overwrite a status that is no longer ours to move (a racing cancel).
/// Returns the updated task, or `None` when the transition was abandoned.
async fn transition(
    repo: &Arc<dyn TaskRepository>,
    mut task: Task,
    to: TaskStatus,
    results: Option<String>,
    error: Option<String>,
) -> Option<Task> {
    loop {
        if !task.status.can_transition_to(to) {
            debug!(
                task_id = %task.id,
                from = task.status.as_str(),
                to = to.as_str(),
                "transition refused, task moved concurrently"
            );
            return None;
        }

        let expected = task.version;
        let mut updated = task.clone();
        // Checked above; transition_to only stamps timestamps here.
        updated.transition_to(to).ok()?;
        updated.results = results.clone();
        updated.error = error.clone();

        match repo.update(&updated, expected).await {
            Ok(()) => return Some(updated),
            Err(DomainError::ConcurrencyConflict(_)) => {
                task = match repo.get(task.id).await {
                    Ok(task) => task,
                    Err(err) => {
                        error!(task_id = %updated.id, %err, "re-read after conflict failed");
                        return None;
                    }
                };
            }
            Err(err) => {
                error!(task_id = %updated.id, %err, "failed to persist transition");
                return None;
            }
        }
    }
}
