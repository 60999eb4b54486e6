//! Domain models.

pub mod config;
pub mod principal;
pub mod task;

pub use config::{
    AdmissionConfig, ApiKeyConfig, Config, DatabaseConfig, ExecutionConfig, LoggingConfig,
    ServerConfig,
};
pub use principal::{Principal, Role};
pub use task::{Task, TaskPriority, TaskStatus, TaskStatusReport};
