//! SQLite implementation of the TaskRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Task, TaskPriority, TaskStatus};
use crate::domain::ports::TaskRepository;

#[derive(Clone)]
pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn create(&self, task: &Task) -> DomainResult<()> {
        let result = sqlx::query(
            r#"INSERT INTO tasks (id, owner, dataset_id, code, status, priority,
               timeout_secs, results, error, version, created_at, updated_at, started_at, ended_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(task.id.to_string())
        .bind(&task.owner)
        .bind(&task.dataset_id)
        .bind(&task.code)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(i64::from(task.timeout_secs))
        .bind(&task.results)
        .bind(&task.error)
        .bind(task.version)
        .bind(task.created_at.to_rfc3339())
        .bind(task.updated_at.to_rfc3339())
        .bind(task.started_at.map(|t| t.to_rfc3339()))
        .bind(task.ended_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DomainError::Conflict(task.id))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get(&self, id: Uuid) -> DomainResult<Task> {
        let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => r.try_into(),
            None => Err(DomainError::TaskNotFound(id)),
        }
    }

    async fn update(&self, task: &Task, expected_version: i64) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE tasks SET status = ?, priority = ?, timeout_secs = ?,
               results = ?, error = ?, version = ?, updated_at = ?, started_at = ?, ended_at = ?
               WHERE id = ? AND version = ?"#,
        )
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(i64::from(task.timeout_secs))
        .bind(&task.results)
        .bind(&task.error)
        .bind(task.version)
        .bind(task.updated_at.to_rfc3339())
        .bind(task.started_at.map(|t| t.to_rfc3339()))
        .bind(task.ended_at.map(|t| t.to_rfc3339()))
        .bind(task.id.to_string())
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish a missing row from a lost compare-and-set.
            let exists: Option<(i64,)> = sqlx::query_as("SELECT version FROM tasks WHERE id = ?")
                .bind(task.id.to_string())
                .fetch_optional(&self.pool)
                .await?;
            return match exists {
                Some(_) => Err(DomainError::ConcurrencyConflict(task.id)),
                None => Err(DomainError::TaskNotFound(task.id)),
            };
        }

        Ok(())
    }

    async fn list_by_owner(&self, owner: &str) -> DomainResult<Vec<Task>> {
        let rows: Vec<TaskRow> =
            sqlx::query_as("SELECT * FROM tasks WHERE owner = ? ORDER BY created_at DESC")
                .bind(owner)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_by_status(&self) -> DomainResult<HashMap<TaskStatus, i64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM tasks GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = HashMap::new();
        for (status, count) in rows {
            if let Some(status) = TaskStatus::from_str(&status) {
                counts.insert(status, count);
            }
        }
        Ok(counts)
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    owner: String,
    dataset_id: String,
    code: String,
    status: String,
    priority: String,
    timeout_secs: i64,
    results: Option<String>,
    error: Option<String>,
    version: i64,
    created_at: String,
    updated_at: String,
    started_at: Option<String>,
    ended_at: Option<String>,
}

impl TryFrom<TaskRow> for Task {
    type Error = DomainError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| DomainError::Database(format!("invalid task id: {e}")))?,
            owner: row.owner,
            dataset_id: row.dataset_id,
            code: row.code,
            status: TaskStatus::from_str(&row.status)
                .ok_or_else(|| DomainError::Database(format!("unknown status: {}", row.status)))?,
            priority: TaskPriority::from_str(&row.priority).unwrap_or_default(),
            timeout_secs: u32::try_from(row.timeout_secs)
                .map_err(|_| DomainError::Database("negative timeout".to_string()))?,
            results: row.results,
            error: row.error,
            version: row.version,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            started_at: row.started_at.as_deref().map(parse_timestamp).transpose()?,
            ended_at: row.ended_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

fn parse_timestamp(s: &str) -> DomainResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DomainError::Database(format!("invalid timestamp: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::connection::create_test_pool;

    async fn repo() -> SqliteTaskRepository {
        SqliteTaskRepository::new(create_test_pool().await.expect("test pool"))
    }

    fn sample_task(owner: &str) -> Task {
        Task::new(owner, "d1", "print(1)", 300, TaskPriority::Normal)
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let repo = repo().await;
        let task = sample_task("u1");
        repo.create(&task).await.unwrap();

        let loaded = repo.get(task.id).await.unwrap();
        assert_eq!(loaded.id, task.id);
        assert_eq!(loaded.status, TaskStatus::Queued);
        assert_eq!(loaded.timeout_secs, 300);
    }

    #[tokio::test]
    async fn duplicate_create_is_conflict() {
        let repo = repo().await;
        let task = sample_task("u1");
        repo.create(&task).await.unwrap();

        let err = repo.create(&task).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(id) if id == task.id));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let repo = repo().await;
        let err = repo.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn stale_version_update_is_concurrency_conflict() {
        let repo = repo().await;
        let mut task = sample_task("u1");
        repo.create(&task).await.unwrap();

        let stale_version = task.version;
        task.transition_to(TaskStatus::Running).unwrap();
        repo.update(&task, stale_version).await.unwrap();

        // A second writer holding the original version must lose.
        let mut racer = repo.get(task.id).await.unwrap();
        racer.version = stale_version + 1;
        let err = repo.update(&racer, stale_version).await.unwrap_err();
        assert!(matches!(err, DomainError::ConcurrencyConflict(_)));
    }

    #[tokio::test]
    async fn list_by_owner_is_newest_first_and_scoped() {
        let repo = repo().await;
        let mut first = sample_task("u1");
        first.created_at = Utc::now() - chrono::Duration::seconds(5);
        repo.create(&first).await.unwrap();
        let second = sample_task("u1");
        repo.create(&second).await.unwrap();
        repo.create(&sample_task("u2")).await.unwrap();

        let tasks = repo.list_by_owner("u1").await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, second.id);
        assert_eq!(tasks[1].id, first.id);
    }

    #[tokio::test]
    async fn count_by_status_aggregates() {
        let repo = repo().await;
        repo.create(&sample_task("u1")).await.unwrap();
        let mut running = sample_task("u1");
        running.transition_to(TaskStatus::Running).unwrap();
        repo.create(&running).await.unwrap();

        let counts = repo.count_by_status().await.unwrap();
        assert_eq!(counts.get(&TaskStatus::Queued), Some(&1));
        assert_eq!(counts.get(&TaskStatus::Running), Some(&1));
    }
}
