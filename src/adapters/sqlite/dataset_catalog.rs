//! SQLite-backed dataset metadata lookup.
//!
//! Dataset upload, content storage, and schema inspection live in the
//! dataset collaborator; the pipeline only needs ownership and size.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{DatasetCatalog, DatasetMeta};

#[derive(Clone)]
pub struct SqliteDatasetCatalog {
    pool: SqlitePool,
}

impl SqliteDatasetCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record dataset metadata. Used by the upload collaborator and by
    /// test fixtures.
    pub async fn put(&self, meta: &DatasetMeta) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT OR REPLACE INTO datasets (id, owner, filename, size_bytes, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(&meta.id)
        .bind(&meta.owner)
        .bind(&meta.filename)
        .bind(meta.size_bytes)
        .bind(meta.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DatasetCatalog for SqliteDatasetCatalog {
    async fn get(&self, id: &str) -> DomainResult<DatasetMeta> {
        let row: Option<(String, String, String, i64, String)> = sqlx::query_as(
            "SELECT id, owner, filename, size_bytes, created_at FROM datasets WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, owner, filename, size_bytes, created_at)) = row else {
            return Err(DomainError::DatasetNotFound(id.to_string()));
        };

        Ok(DatasetMeta {
            id,
            owner,
            filename,
            size_bytes,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| DomainError::Database(format!("invalid timestamp: {e}")))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::connection::create_test_pool;

    #[tokio::test]
    async fn put_and_get() {
        let catalog = SqliteDatasetCatalog::new(create_test_pool().await.expect("test pool"));
        let meta = DatasetMeta {
            id: "d1".into(),
            owner: "u1".into(),
            filename: "sales.csv".into(),
            size_bytes: 1024,
            created_at: Utc::now(),
        };
        catalog.put(&meta).await.unwrap();

        let loaded = catalog.get("d1").await.unwrap();
        assert_eq!(loaded.owner, "u1");
        assert_eq!(loaded.size_bytes, 1024);
    }

    #[tokio::test]
    async fn missing_dataset_is_not_found() {
        let catalog = SqliteDatasetCatalog::new(create_test_pool().await.expect("test pool"));
        let err = catalog.get("nope").await.unwrap_err();
        assert!(matches!(err, DomainError::DatasetNotFound(_)));
    }
}
