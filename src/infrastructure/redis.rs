//! Shared Redis connection setup.
//!
//! The cache and the rate-limit counter store share one
//! [`ConnectionManager`]; it multiplexes commands over a single connection
//! and reconnects after failures.

use redis::{AsyncCommands, Client, RedisResult, aio::ConnectionManager};
use tracing::info;

/// Opens a connection manager and verifies it with a PING.
///
/// # Errors
///
/// Returns the underlying [`redis::RedisError`] if the URL is invalid, the
/// connection cannot be established, or the PING fails.
pub async fn connect(redis_url: &str) -> RedisResult<ConnectionManager> {
    let client = Client::open(redis_url)?;
    let manager = ConnectionManager::new(client).await?;

    let mut probe = manager.clone();
    probe.ping::<()>().await?;

    info!("Connected to Redis");
    Ok(manager)
}
