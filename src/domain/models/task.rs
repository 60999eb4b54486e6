//! Task domain model.
//!
//! A task is one admitted code-execution request, tracked from submission
//! through a terminal state. Terminal states are absorbing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a task in the execution pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Accepted by the queue, waiting for a worker
    Queued,
    /// A worker is executing the submitted code
    Running,
    /// Execution finished successfully
    Completed,
    /// Execution failed or timed out
    Failed,
    /// Explicitly cancelled before completion
    Cancelled,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Queued
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "queued" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "completed" | "complete" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether a cancel request can still take effect.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    /// Valid transitions from this status.
    pub fn valid_transitions(&self) -> Vec<TaskStatus> {
        match self {
            Self::Queued => vec![Self::Running, Self::Cancelled],
            Self::Running => vec![Self::Completed, Self::Failed, Self::Cancelled],
            Self::Completed | Self::Failed | Self::Cancelled => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

/// Priority level for tasks.
///
/// Accepted at submission but not currently load-bearing: the queue is
/// single-priority FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low = 1,
    Normal = 2,
    High = 3,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Normal
    }
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// One admitted code-execution request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, minted once at submission by the queue
    pub id: Uuid,
    /// Identity of the submitting principal
    pub owner: String,
    /// Target dataset identity
    pub dataset_id: String,
    /// Submitted code; opaque to the pipeline
    pub code: String,
    /// Current status
    pub status: TaskStatus,
    /// Priority (single-priority FIFO for now)
    pub priority: TaskPriority,
    /// Timeout bound passed to the execution capability, in seconds
    pub timeout_secs: u32,
    /// Opaque results blob, set only on successful completion
    pub results: Option<String>,
    /// Error message, set only on failure
    pub error: Option<String>,
    /// Version for optimistic locking
    pub version: i64,
    /// When submitted
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
    /// When execution started
    pub started_at: Option<DateTime<Utc>>,
    /// When a terminal state was reached
    pub ended_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new queued task. The id minted here is authoritative.
    pub fn new(
        owner: impl Into<String>,
        dataset_id: impl Into<String>,
        code: impl Into<String>,
        timeout_secs: u32,
        priority: TaskPriority,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            dataset_id: dataset_id.into(),
            code: code.into(),
            status: TaskStatus::Queued,
            priority,
            timeout_secs,
            results: None,
            error: None,
            version: 1,
            created_at: now,
            updated_at: now,
            started_at: None,
            ended_at: None,
        }
    }

    /// Check if can transition to given status.
    pub fn can_transition_to(&self, new_status: TaskStatus) -> bool {
        self.status.can_transition_to(new_status)
    }

    /// Transition to a new status, stamping timestamps and bumping the
    /// version. Rejects transitions out of terminal states.
    pub fn transition_to(&mut self, new_status: TaskStatus) -> Result<(), String> {
        if !self.can_transition_to(new_status) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.status.as_str(),
                new_status.as_str()
            ));
        }

        self.status = new_status;
        self.updated_at = Utc::now();
        self.version += 1;

        match new_status {
            TaskStatus::Running => self.started_at = Some(Utc::now()),
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled => {
                self.ended_at = Some(Utc::now());
            }
            TaskStatus::Queued => {}
        }

        Ok(())
    }

    /// Check if task is terminal.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Validate task fields at submission.
    pub fn validate(&self) -> Result<(), String> {
        if self.owner.is_empty() {
            return Err("Task owner cannot be empty".to_string());
        }
        if self.dataset_id.is_empty() {
            return Err("Dataset id cannot be empty".to_string());
        }
        if self.code.trim().is_empty() {
            return Err("Submitted code cannot be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("Timeout must be positive".to_string());
        }
        Ok(())
    }
}

/// Status payload returned by the queue's status lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusReport {
    pub task_id: Uuid,
    pub status: TaskStatus,
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Task> for TaskStatusReport {
    fn from(task: &Task) -> Self {
        let progress = match task.status {
            TaskStatus::Queued => 0.0,
            TaskStatus::Running => 50.0,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled => 100.0,
        };
        Self {
            task_id: task.id,
            status: task.status,
            progress,
            start_time: task.started_at,
            end_time: task.ended_at,
            results: task.results.clone(),
            error: task.error.clone(),
        }
    }
}
