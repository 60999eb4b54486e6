use crate::domain::errors::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Ownership and size metadata for an uploaded dataset. Content storage
/// and parsing live in the dataset collaborator, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetMeta {
    pub id: String,
    pub owner: String,
    pub filename: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// Lookup port over the dataset collaborator.
#[async_trait]
pub trait DatasetCatalog: Send + Sync {
    /// Fetch dataset metadata. Fails with `DomainError::DatasetNotFound`
    /// when absent.
    async fn get(&self, id: &str) -> DomainResult<DatasetMeta>;
}
