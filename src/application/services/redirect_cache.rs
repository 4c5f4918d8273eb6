//! Read-through cache for redirect resolution.
//!
//! Durable storage is authoritative. A cached redirect never outlives the
//! link it points to: its TTL is the smaller of a fixed ceiling and the
//! link's remaining lifetime.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::application::services::metrics_aggregator::MetricsAggregator;
use crate::domain::clock::Clock;
use crate::domain::entities::{NewLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::deadline::with_deadline;

#[derive(Debug, Clone)]
pub struct RedirectCacheConfig {
    /// Upper bound for any cached redirect.
    pub ttl_ceiling: Duration,
    pub store_timeout: Duration,
    pub db_timeout: Duration,
}

impl Default for RedirectCacheConfig {
    fn default() -> Self {
        Self {
            ttl_ceiling: Duration::from_secs(24 * 60 * 60),
            store_timeout: Duration::from_millis(250),
            db_timeout: Duration::from_secs(5),
        }
    }
}

pub fn redirect_key(code: &str) -> String {
    format!("shorturl:{code}")
}

/// How long a redirect for `link` may be cached at `now`.
///
/// Returns `None` when the link is expired or has less than a second left,
/// which the cache backends cannot represent.
pub fn cache_ttl(link: &ShortLink, now: DateTime<Utc>, ceiling: Duration) -> Option<Duration> {
    let ttl = match link.remaining_lifetime(now) {
        Some(remaining) => remaining.min(ceiling),
        None => ceiling,
    };
    (ttl.as_secs() > 0).then_some(ttl)
}

pub struct RedirectCache {
    cache: Arc<dyn CacheService>,
    repository: Arc<dyn LinkRepository>,
    metrics: Arc<MetricsAggregator>,
    clock: Arc<dyn Clock>,
    config: RedirectCacheConfig,
}

impl RedirectCache {
    pub fn new(
        cache: Arc<dyn CacheService>,
        repository: Arc<dyn LinkRepository>,
        metrics: Arc<MetricsAggregator>,
        clock: Arc<dyn Clock>,
        config: RedirectCacheConfig,
    ) -> Self {
        Self {
            cache,
            repository,
            metrics,
            clock,
            config,
        }
    }

    /// Resolves a short code to its long URL.
    ///
    /// Cache failures and timeouts count as misses. Expired links resolve to
    /// `None` even while their row still exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if durable storage times out and
    /// [`AppError::Internal`] on storage errors.
    pub async fn resolve(&self, code: &str) -> Result<Option<String>, AppError> {
        let key = redirect_key(code);

        match tokio::time::timeout(self.config.store_timeout, self.cache.get(&key)).await {
            Ok(Ok(Some(long_url))) => {
                debug!(code, "Redirect cache HIT");
                metrics::counter!("redirect_cache_hits_total").increment(1);
                return Ok(Some(long_url));
            }
            Ok(Ok(None)) => debug!(code, "Redirect cache MISS"),
            Ok(Err(e)) => warn!(code, error = %e, "Redirect cache read failed"),
            Err(_) => warn!(code, "Redirect cache read timed out"),
        }
        metrics::counter!("redirect_cache_misses_total").increment(1);

        let Some(link) = self.lookup(code).await? else {
            return Ok(None);
        };

        let now = self.clock.now();
        if link.is_expired_at(now) {
            debug!(code, "Link expired");
            return Ok(None);
        }

        if let Some(ttl) = cache_ttl(&link, now, self.config.ttl_ceiling) {
            let write = self.cache.set(&key, &link.long_url, ttl);
            match tokio::time::timeout(self.config.store_timeout, write).await {
                Ok(Ok(())) => debug!(code, ttl_seconds = ttl.as_secs(), "Redirect cached"),
                Ok(Err(e)) => warn!(code, error = %e, "Failed to cache redirect"),
                Err(_) => warn!(code, "Timed out caching redirect"),
            }
        }

        Ok(Some(link.long_url))
    }

    /// Stores a new link unless `code` is already taken.
    ///
    /// Returns `true` if this call inserted the row. Only then is the owner's
    /// domain count incremented. The redirect cache is not touched: a new
    /// code cannot have a cached entry yet.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if durable storage times out and
    /// [`AppError::Internal`] on storage errors.
    pub async fn save(
        &self,
        long_url: &str,
        code: &str,
        owner_id: i64,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<bool, AppError> {
        let new_link = NewLink {
            code: code.to_string(),
            long_url: long_url.to_string(),
            owner_id,
            expires_at,
        };

        let inserted = with_deadline(
            self.config.db_timeout,
            "save_link",
            self.repository.save(new_link),
        )
        .await?;

        if inserted {
            self.metrics.increment_domain(owner_id, long_url).await?;
        } else {
            debug!(code, "Code already taken, insert ignored");
        }
        Ok(inserted)
    }

    /// Deletes an owner's link and evicts its cached redirect.
    ///
    /// Returns `false` if the code does not exist or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if durable storage times out and
    /// [`AppError::Internal`] on storage errors.
    pub async fn delete(&self, owner_id: i64, code: &str) -> Result<bool, AppError> {
        let removed = with_deadline(
            self.config.db_timeout,
            "delete_link",
            self.repository.delete(owner_id, code),
        )
        .await?;

        if !removed {
            return Ok(false);
        }

        let key = redirect_key(code);
        match tokio::time::timeout(self.config.store_timeout, self.cache.delete(&key)).await {
            Ok(Ok(())) => debug!(code, "Redirect cache entry evicted"),
            Ok(Err(e)) => warn!(code, error = %e, "Failed to evict redirect"),
            Err(_) => warn!(code, "Timed out evicting redirect"),
        }
        self.metrics.invalidate(owner_id).await;

        Ok(true)
    }

    /// Finds the newest live code assigned to `long_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if durable storage times out and
    /// [`AppError::Internal`] on storage errors.
    pub async fn get_code(&self, long_url: &str) -> Result<Option<String>, AppError> {
        with_deadline(
            self.config.db_timeout,
            "get_code",
            self.repository.get_code(long_url, self.clock.now()),
        )
        .await
    }

    /// Reads a link straight from durable storage, bypassing the cache.
    ///
    /// Expired links are returned as stored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if durable storage times out and
    /// [`AppError::Internal`] on storage errors.
    pub async fn lookup(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        with_deadline(
            self.config.db_timeout,
            "find_link",
            self.repository.find_by_code(code),
        )
        .await
    }

    /// Lists an owner's links, newest first, including expired ones.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if durable storage times out and
    /// [`AppError::Internal`] on storage errors.
    pub async fn links_for_owner(&self, owner_id: i64) -> Result<Vec<ShortLink>, AppError> {
        with_deadline(
            self.config.db_timeout,
            "list_links",
            self.repository.list_by_owner(owner_id),
        )
        .await
    }
}
