//! SQLite adapters for the repository, counter-store, and catalog ports.

pub mod connection;
pub mod counter_store;
pub mod dataset_catalog;
pub mod task_repository;

pub use connection::{create_pool, create_test_pool, run_migrations, ConnectionError, PoolConfig};
pub use counter_store::SqliteCounterStore;
pub use dataset_catalog::SqliteDatasetCatalog;
pub use task_repository::SqliteTaskRepository;
