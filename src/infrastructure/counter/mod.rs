//! Atomic counters with expiry, used by the rate limiter.
//!
//! - [`RedisCounterStore`] - shared across all server processes
//! - [`MemoryCounterStore`] - single process only

mod memory_counter_store;
mod redis_counter_store;
mod service;

pub use memory_counter_store::MemoryCounterStore;
pub use redis_counter_store::RedisCounterStore;
pub use service::{CounterResult, CounterStore, CounterStoreError};

#[cfg(test)]
pub use service::MockCounterStore;
