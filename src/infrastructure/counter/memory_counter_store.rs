//! In-process counter store.

use super::service::{CounterResult, CounterStore};
use crate::domain::clock::Clock;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy)]
struct Counter {
    value: i64,
    expires_at: Option<DateTime<Utc>>,
}

impl Counter {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Counters held in a process-local map.
///
/// Limits enforced through this store are per process. It backs single-node
/// runs without Redis and the test suite. Increments happen under the write
/// lock, so same-key increments are linearizable.
pub struct MemoryCounterStore {
    counters: RwLock<HashMap<String, Counter>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCounterStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Drops every counter whose expiry has passed.
    pub async fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let mut counters = self.counters.write().await;
        let before = counters.len();
        counters.retain(|_, c| c.is_live(now));
        before - counters.len()
    }
}

/// `None` when the deadline is beyond what `DateTime` can represent.
fn deadline(now: DateTime<Utc>, ttl: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, key: &str) -> CounterResult<i64> {
        let now = self.clock.now();
        let mut counters = self.counters.write().await;
        let counter = counters.entry(key.to_string()).or_insert(Counter {
            value: 0,
            expires_at: None,
        });
        if !counter.is_live(now) {
            *counter = Counter {
                value: 0,
                expires_at: None,
            };
        }
        counter.value += 1;
        Ok(counter.value)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CounterResult<()> {
        let now = self.clock.now();
        let mut counters = self.counters.write().await;
        if let Some(counter) = counters.get_mut(key)
            && counter.is_live(now)
        {
            counter.expires_at = deadline(now, ttl);
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> CounterResult<Option<i64>> {
        let now = self.clock.now();
        let counters = self.counters.read().await;
        Ok(counters
            .get(key)
            .filter(|c| c.is_live(now))
            .map(|c| c.value))
    }

    async fn increment_with_expiry(&self, key: &str, ttl: Duration) -> CounterResult<i64> {
        let now = self.clock.now();
        let mut counters = self.counters.write().await;
        let counter = counters.entry(key.to_string()).or_insert(Counter {
            value: 0,
            expires_at: None,
        });
        if !counter.is_live(now) {
            counter.value = 0;
        }
        counter.value += 1;
        counter.expires_at = deadline(now, ttl);
        Ok(counter.value)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
