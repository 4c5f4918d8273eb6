//! Link shortening, the entry point handlers talk to.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::services::metrics_aggregator::MetricsAggregator;
use crate::application::services::redirect_cache::RedirectCache;
use crate::domain::clock::Clock;
use crate::domain::entities::{DomainCount, ShortLink};
use crate::error::AppError;
use crate::utils::code_generator::{MAX_CODE_ATTEMPTS, derive_code};
use crate::utils::url_normalizer::normalize_url;

/// Result of a shorten request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenOutcome {
    pub code: String,
    pub expires_at: Option<DateTime<Utc>>,
    /// `false` when an existing code for the same URL was returned.
    pub created: bool,
}

/// Service for creating and resolving short links.
///
/// Handles URL normalization and code assignment, then delegates storage to
/// [`RedirectCache`] and domain counting to [`MetricsAggregator`].
pub struct ShorteningService {
    redirects: Arc<RedirectCache>,
    metrics: Arc<MetricsAggregator>,
    clock: Arc<dyn Clock>,
    base_url: String,
}

impl ShorteningService {
    pub fn new(
        redirects: Arc<RedirectCache>,
        metrics: Arc<MetricsAggregator>,
        clock: Arc<dyn Clock>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            redirects,
            metrics,
            clock,
            base_url: base_url.into(),
        }
    }

    /// Shortens `long_url` on behalf of `owner_id`.
    ///
    /// # Deduplication
    ///
    /// If the normalized URL already has a live code, that code is returned
    /// and the owner's domain count still goes up by one. Codes are global:
    /// the returned code may have been created by another owner.
    ///
    /// # Code Generation
    ///
    /// Codes are derived from the normalized URL. When the derived code is
    /// held by a different URL, a salted derivation is tried, up to
    /// [`MAX_CODE_ATTEMPTS`] collisions. Codes held by expired copies of the
    /// same URL are skipped and do not count as collisions.
    ///
    /// `expiry_days` of `None` or `Some(0)` creates a link that never expires.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for empty input or a non-HTTP(S) URL.
    /// Returns [`AppError::Internal`] if no free code was found.
    /// Returns [`AppError::Unavailable`] if durable storage times out.
    pub async fn shorten(
        &self,
        long_url: &str,
        owner_id: i64,
        expiry_days: Option<u32>,
    ) -> Result<ShortenOutcome, AppError> {
        let normalized = normalize_url(long_url).map_err(|e| {
            AppError::bad_request("Invalid URL", json!({ "reason": e.to_string() }))
        })?;
        let now = self.clock.now();

        if let Some(code) = self.redirects.get_code(&normalized).await? {
            match self.redirects.lookup(&code).await? {
                Some(existing) if !existing.is_expired_at(now) => {
                    return self.reuse(owner_id, existing).await;
                }
                _ => debug!(code, "Existing code is expired or gone, allocating a new one"),
            }
        }

        let expires_at = expiry_days
            .filter(|days| *days > 0)
            .map(|days| now + chrono::Duration::days(i64::from(days)));

        // Salts held by expired copies of this URL are stepped over without
        // counting against the collision budget.
        let mut collisions = 0;
        for salt in 0..=u32::MAX {
            if collisions == MAX_CODE_ATTEMPTS {
                break;
            }
            let code = derive_code(&normalized, salt);

            if self
                .redirects
                .save(&normalized, &code, owner_id, expires_at)
                .await?
            {
                info!(code, owner_id, "Short link created");
                return Ok(ShortenOutcome {
                    code,
                    expires_at,
                    created: true,
                });
            }

            // Lost the insert: a concurrent shorten of the same URL won, an
            // expired copy holds the code, or another URL owns it.
            match self.redirects.lookup(&code).await? {
                Some(existing) if existing.long_url == normalized => {
                    if !existing.is_expired_at(now) {
                        return self.reuse(owner_id, existing).await;
                    }
                    debug!(code, salt, "Code held by an expired copy");
                }
                _ => {
                    collisions += 1;
                    debug!(code, salt, "Short code collision");
                }
            }
        }

        Err(AppError::internal(
            "Failed to allocate a short code",
            json!({ "attempts": MAX_CODE_ATTEMPTS }),
        ))
    }

    async fn reuse(&self, owner_id: i64, existing: ShortLink) -> Result<ShortenOutcome, AppError> {
        self.metrics
            .increment_domain(owner_id, &existing.long_url)
            .await?;
        debug!(code = %existing.code, owner_id, "Reusing existing short link");
        Ok(ShortenOutcome {
            code: existing.code,
            expires_at: existing.expires_at,
            created: false,
        })
    }

    /// Resolves a code to its long URL. `None` for unknown or expired codes.
    pub async fn redirect(&self, code: &str) -> Result<Option<String>, AppError> {
        self.redirects.resolve(code).await
    }

    /// All links owned by `owner_id`, newest first.
    pub async fn links(&self, owner_id: i64) -> Result<Vec<ShortLink>, AppError> {
        self.redirects.links_for_owner(owner_id).await
    }

    /// Deletes an owned link. `false` if nothing was removed.
    pub async fn delete(&self, owner_id: i64, code: &str) -> Result<bool, AppError> {
        self.redirects.delete(owner_id, code).await
    }

    pub async fn top_domains(&self, owner_id: i64, n: usize) -> Result<Vec<DomainCount>, AppError> {
        self.metrics.top_domains(owner_id, n).await
    }

    /// Renders the public short URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }
}
