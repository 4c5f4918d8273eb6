//! Per-owner "top domains" metrics with a cached read path.
//!
//! Counts live in durable storage. The top-N list is cached per owner for a
//! fixed TTL and dropped whenever that owner's counts change.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::entities::DomainCount;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::deadline::with_deadline;
use crate::utils::extract_domain::extract_domain;

#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub cache_ttl: Duration,
    pub store_timeout: Duration,
    pub db_timeout: Duration,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(600),
            store_timeout: Duration::from_millis(250),
            db_timeout: Duration::from_secs(5),
        }
    }
}

/// Cached top-N list together with the N it was built for.
#[derive(Debug, Serialize, Deserialize)]
struct TopDomainsEntry {
    limit: usize,
    items: Vec<DomainCount>,
}

pub fn top_domains_key(owner_id: i64) -> String {
    format!("metrics:topdomains:{owner_id}")
}

pub struct MetricsAggregator {
    cache: Arc<dyn CacheService>,
    repository: Arc<dyn LinkRepository>,
    config: MetricsConfig,
}

impl MetricsAggregator {
    pub fn new(
        cache: Arc<dyn CacheService>,
        repository: Arc<dyn LinkRepository>,
        config: MetricsConfig,
    ) -> Self {
        Self {
            cache,
            repository,
            config,
        }
    }

    /// Counts one more link on the domain of `long_url` for `owner_id`.
    ///
    /// URLs without a host are ignored. On success the owner's cached top
    /// list is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if durable storage times out and
    /// [`AppError::Internal`] on storage errors.
    pub async fn increment_domain(&self, owner_id: i64, long_url: &str) -> Result<(), AppError> {
        let Some(domain) = extract_domain(long_url) else {
            debug!(owner_id, "No domain in URL, skipping domain count");
            return Ok(());
        };

        with_deadline(
            self.config.db_timeout,
            "increment_domain_count",
            self.repository.increment_domain_count(owner_id, &domain),
        )
        .await?;

        self.invalidate(owner_id).await;
        Ok(())
    }

    /// Returns at most `n` of the owner's domains, by count descending then
    /// domain ascending.
    ///
    /// A cached list built for at least `n` entries is reused; anything else
    /// (miss, cache failure, undecodable entry, smaller list) reads durable
    /// storage and refills the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if durable storage times out and
    /// [`AppError::Internal`] on storage errors.
    pub async fn top_domains(&self, owner_id: i64, n: usize) -> Result<Vec<DomainCount>, AppError> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let key = top_domains_key(owner_id);
        if let Some(mut entry) = self.read_cached(&key).await
            && entry.limit >= n
        {
            debug!(owner_id, "Top domains cache HIT");
            entry.items.truncate(n);
            return Ok(entry.items);
        }

        debug!(owner_id, "Top domains cache MISS");
        let limit = i64::try_from(n).map_err(|_| {
            AppError::bad_request("Requested too many domains", json!({ "n": n }))
        })?;
        let items = with_deadline(
            self.config.db_timeout,
            "top_domains",
            self.repository.top_domains(owner_id, limit),
        )
        .await?;

        self.write_cached(&key, &TopDomainsEntry { limit: n, items: items.clone() })
            .await;
        Ok(items)
    }

    /// Drops the owner's cached top list. Failures are logged only; the
    /// entry then ages out with its TTL.
    pub async fn invalidate(&self, owner_id: i64) {
        let key = top_domains_key(owner_id);
        match tokio::time::timeout(self.config.store_timeout, self.cache.delete(&key)).await {
            Ok(Ok(())) => debug!(owner_id, "Top domains cache invalidated"),
            Ok(Err(e)) => warn!(owner_id, error = %e, "Failed to invalidate top domains cache"),
            Err(_) => warn!(owner_id, "Timed out invalidating top domains cache"),
        }
    }

    async fn read_cached(&self, key: &str) -> Option<TopDomainsEntry> {
        let raw = match tokio::time::timeout(self.config.store_timeout, self.cache.get(key)).await {
            Ok(Ok(raw)) => raw?,
            Ok(Err(e)) => {
                warn!(key, error = %e, "Cache read failed, falling back to storage");
                return None;
            }
            Err(_) => {
                warn!(key, "Cache read timed out, falling back to storage");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable top domains entry");
                None
            }
        }
    }

    async fn write_cached(&self, key: &str, entry: &TopDomainsEntry) {
        let raw = match serde_json::to_string(entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode top domains entry");
                return;
            }
        };

        let write = self.cache.set(key, &raw, self.config.cache_ttl);
        match tokio::time::timeout(self.config.store_timeout, write).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(key, error = %e, "Failed to cache top domains"),
            Err(_) => warn!(key, "Timed out caching top domains"),
        }
    }
}
