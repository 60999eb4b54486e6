//! DeepSandbox - admission-controlled code execution API.
//!
//! Accepts code-execution requests against uploaded datasets, admits them
//! under per-user rate and daily quota limits, and tracks each request
//! through an asynchronous lifecycle (queued → running → terminal) with
//! status lookup and cancellation.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, ports, and errors
//! - **Service Layer** (`services`): admission, queueing, lifecycle driving
//! - **Adapters** (`adapters`): SQLite persistence, stub executor, identity
//! - **API Layer** (`api`): axum router, middleware chain, handlers
//! - **Infrastructure** (`infrastructure`): configuration loading

pub mod adapters;
pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use api::{build_router, AppState};
pub use domain::errors::{AdmissionScope, DomainError, DomainResult};
pub use domain::models::{
    Config, Principal, Role, Task, TaskPriority, TaskStatus, TaskStatusReport,
};
pub use domain::ports::{
    Admission, CodeExecutor, CounterStore, DatasetCatalog, DatasetMeta, IdentityProvider,
    TaskRepository,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ExecutionWorkerPool, TaskQueueService};
