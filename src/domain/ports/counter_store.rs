use crate::domain::errors::DomainResult;
use async_trait::async_trait;
use std::time::Duration;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Whether the request was admitted
    pub admitted: bool,
    /// Counter value after the operation
    pub current_count: i64,
}

/// Port over the shared fixed-window counter store.
///
/// Counters back both the request rate limiter and the daily execution
/// quota. A window's expiry is set once at creation and never extended;
/// rejected requests do not increment. Implementations must be atomic per
/// key so concurrent increments cannot race past the limit beyond the
/// inherent fixed-window slack.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Check the counter for `key` and increment it when under `limit`.
    ///
    /// A missing or expired window is created with count 1 and expiry
    /// `now + window`, and the request is admitted.
    async fn check_and_increment(
        &self,
        key: &str,
        window: Duration,
        limit: i64,
    ) -> DomainResult<Admission>;
}
