//! Counter store trait and error types.

use async_trait::async_trait;
use std::time::Duration;

/// Errors returned by a [`CounterStore`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum CounterStoreError {
    #[error("Counter store connection error: {0}")]
    Connection(String),
    #[error("Counter store operation error: {0}")]
    Operation(String),
    #[error("Counter store timed out after {0:?}")]
    Timeout(Duration),
}

impl From<redis::RedisError> for CounterStoreError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() {
            Self::Connection(e.to_string())
        } else {
            Self::Operation(e.to_string())
        }
    }
}

pub type CounterResult<T> = Result<T, CounterStoreError>;

/// Remote atomic counters with expiry.
///
/// The rate limiter is the only consumer. Increments on the same key must be
/// linearizable; a key must vanish once its expiry passes without further
/// writes.
///
/// # Implementations
///
/// - [`crate::infrastructure::counter::RedisCounterStore`] - Redis `INCR`/`EXPIRE`
/// - [`crate::infrastructure::counter::MemoryCounterStore`] - Process-local map
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically adds one to `key`, creating it at 1 when absent.
    async fn increment(&self, key: &str) -> CounterResult<i64>;

    /// Sets `key` to expire after `ttl`. A missing key is not an error.
    async fn expire(&self, key: &str, ttl: Duration) -> CounterResult<()>;

    /// Reads `key` without modifying it.
    async fn get(&self, key: &str) -> CounterResult<Option<i64>>;

    /// Increments `key` and (re)sets its expiry.
    ///
    /// The default issues two calls; backends that can do both in one round
    /// trip should override it so a counter never exists without an expiry.
    async fn increment_with_expiry(&self, key: &str, ttl: Duration) -> CounterResult<i64> {
        let value = self.increment(key).await?;
        self.expire(key, ttl).await?;
        Ok(value)
    }

    /// Checks if the backend is reachable.
    async fn health_check(&self) -> bool;
}
