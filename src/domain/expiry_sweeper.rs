//! Background task that physically removes expired links.
//!
//! Expired links are already invisible to readers; the sweeper only reclaims
//! storage. A failed purge is retried with exponential backoff and then left
//! for the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::clock::Clock;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const MAX_PURGE_ATTEMPTS: usize = 3;

/// Runs one purge pass, retrying transient failures.
///
/// Returns the number of links removed.
pub async fn purge_once(
    repository: &Arc<dyn LinkRepository>,
    clock: &Arc<dyn Clock>,
) -> Result<u64, AppError> {
    let strategy = ExponentialBackoff::from_millis(50)
        .map(jitter)
        .take(MAX_PURGE_ATTEMPTS - 1);

    Retry::start(strategy, || {
        let repository = repository.clone();
        let now = clock.now();
        async move { repository.purge_expired(now).await }
    })
    .await
}

/// Purges expired links every `interval` until the task is dropped.
///
/// The first tick fires immediately so a restarted server reclaims space
/// straight away.
pub async fn run_expiry_sweeper(
    repository: Arc<dyn LinkRepository>,
    clock: Arc<dyn Clock>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match purge_once(&repository, &clock).await {
            Ok(0) => tracing::debug!("Expiry sweep found nothing to purge"),
            Ok(removed) => {
                metrics::counter!("links_purged_total").increment(removed);
                tracing::info!(removed, "Purged expired links");
            }
            Err(e) => tracing::error!(error = %e, "Expiry sweep failed"),
        }
    }
}
