//! Services: business logic coordination over the domain ports.

pub mod authorize;
pub mod quota;
pub mod task_queue;
pub mod worker_pool;

pub use authorize::authorize;
pub use task_queue::TaskQueueService;
pub use worker_pool::ExecutionWorkerPool;
