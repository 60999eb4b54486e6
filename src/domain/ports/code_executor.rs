use async_trait::async_trait;
use std::time::Duration;

/// Successful execution output. Opaque to the pipeline.
#[derive(Debug, Clone)]
pub struct ExecutionOutput {
    /// Results blob, stored verbatim on the task
    pub results: String,
}

/// Port over the external sandboxed execution capability.
///
/// Process isolation, resource limiting, and output capture are the
/// capability's concern; the pipeline only does the bookkeeping around
/// it. The capability enforces the timeout bound itself.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Run `code` against `dataset_id`, bounded by `timeout`.
    ///
    /// The returned error string is recorded verbatim on the failed task.
    async fn execute(
        &self,
        dataset_id: &str,
        code: &str,
        timeout: Duration,
    ) -> Result<ExecutionOutput, String>;
}
