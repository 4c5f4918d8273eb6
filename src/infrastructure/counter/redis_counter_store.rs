//! Redis-backed counter store.

use super::service::{CounterResult, CounterStore};
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use std::time::Duration;
use tracing::debug;

/// Counters kept in Redis with `INCR` and `EXPIRE`.
///
/// Every Redis instance shared by the server processes sees the same
/// counters, which is what makes the rate limit global rather than per node.
#[derive(Clone)]
pub struct RedisCounterStore {
    conn: ConnectionManager,
}

impl RedisCounterStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

fn ttl_seconds(ttl: Duration) -> i64 {
    ttl.as_secs().max(1) as i64
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str) -> CounterResult<i64> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.incr(key, 1).await?;
        Ok(value)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CounterResult<()> {
        let mut conn = self.conn.clone();
        conn.expire::<_, ()>(key, ttl_seconds(ttl)).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> CounterResult<Option<i64>> {
        let mut conn = self.conn.clone();
        let value: Option<i64> = conn.get(key).await?;
        Ok(value)
    }

    /// `INCR` and `EXPIRE` in one `MULTI`/`EXEC`.
    ///
    /// The expiry is refreshed on every increment. A window key only receives
    /// increments while its window is current, so it still disappears at most
    /// two window lengths after the window closes.
    async fn increment_with_expiry(&self, key: &str, ttl: Duration) -> CounterResult<i64> {
        let mut conn = self.conn.clone();
        let (value,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, ttl_seconds(ttl))
            .ignore()
            .query_async(&mut conn)
            .await?;
        debug!(key, value, "Counter INCR");
        Ok(value)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }
}
