//! SQLite implementation of the fixed-window counter store.
//!
//! The check-and-increment runs inside a single transaction; SQLite
//! serializes writers, which makes the operation atomic per key for both
//! in-process and multi-process deployments. Expired windows are purged
//! lazily on touch, so no background cleanup is needed.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sqlx::SqlitePool;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{Admission, CounterStore};

#[derive(Clone)]
pub struct SqliteCounterStore {
    pool: SqlitePool,
}

impl SqliteCounterStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CounterStore for SqliteCounterStore {
    async fn check_and_increment(
        &self,
        key: &str,
        window: Duration,
        limit: i64,
    ) -> DomainResult<Admission> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM admission_counters WHERE key = ? AND expires_at <= ?")
            .bind(key)
            .bind(now.to_rfc3339())
            .execute(&mut *tx)
            .await?;

        let row: Option<(i64,)> =
            sqlx::query_as("SELECT count FROM admission_counters WHERE key = ?")
                .bind(key)
                .fetch_optional(&mut *tx)
                .await?;

        let admission = match row {
            None => {
                // First touch of the window: expiry is fixed here and never
                // extended by later increments.
                let expires_at = window_expiry(now, window)?;
                sqlx::query(
                    "INSERT INTO admission_counters (key, count, expires_at) VALUES (?, 1, ?)",
                )
                .bind(key)
                .bind(expires_at.to_rfc3339())
                .execute(&mut *tx)
                .await?;
                Admission {
                    admitted: true,
                    current_count: 1,
                }
            }
            Some((count,)) if count >= limit => Admission {
                admitted: false,
                current_count: count,
            },
            Some((count,)) => {
                sqlx::query("UPDATE admission_counters SET count = count + 1 WHERE key = ?")
                    .bind(key)
                    .execute(&mut *tx)
                    .await?;
                Admission {
                    admitted: true,
                    current_count: count + 1,
                }
            }
        };

        tx.commit().await?;
        Ok(admission)
    }
}

fn window_expiry(now: DateTime<Utc>, window: Duration) -> DomainResult<DateTime<Utc>> {
    let window = ChronoDuration::from_std(window)
        .map_err(|e| DomainError::Validation(format!("invalid window: {e}")))?;
    Ok(now + window)
}
