//! Ports: traits at the seams between the pipeline and its collaborators.

pub mod code_executor;
pub mod counter_store;
pub mod dataset_catalog;
pub mod identity_provider;
pub mod task_repository;

pub use code_executor::{CodeExecutor, ExecutionOutput};
pub use counter_store::{Admission, CounterStore};
pub use dataset_catalog::{DatasetCatalog, DatasetMeta};
pub use identity_provider::IdentityProvider;
pub use task_repository::TaskRepository;
