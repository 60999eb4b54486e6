//! Stub execution capability.
//!
//! The real sandbox (container isolation, resource limits, output capture)
//! is an external collaborator. This stub stands in for it in local runs
//! and tests, honouring the port contract: it enforces its own timeout
//! bound and returns either a results blob or an error string.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::ports::{CodeExecutor, ExecutionOutput};

/// Executor that completes after a fixed delay with a canned result.
pub struct StubExecutor {
    delay: Duration,
    fail_with: Option<String>,
}

impl StubExecutor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            fail_with: None,
        }
    }

    /// Executor that always fails with the given message.
    pub fn failing(delay: Duration, message: impl Into<String>) -> Self {
        Self {
            delay,
            fail_with: Some(message.into()),
        }
    }
}

impl Default for StubExecutor {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

#[async_trait]
impl CodeExecutor for StubExecutor {
    async fn execute(
        &self,
        dataset_id: &str,
        _code: &str,
        timeout: Duration,
    ) -> Result<ExecutionOutput, String> {
        if self.delay > timeout {
            tokio::time::sleep(timeout).await;
            return Err(format!(
                "Execution timed out after {} seconds",
                timeout.as_secs()
            ));
        }

        tokio::time::sleep(self.delay).await;

        if let Some(message) = &self.fail_with {
            return Err(message.clone());
        }

        Ok(ExecutionOutput {
            results: format!(r#"{{"dataset_id":"{dataset_id}","result":"Execution completed successfully."}}"#),
        })
    }
}
