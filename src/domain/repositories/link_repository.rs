//! Repository trait for durable link and domain-count storage.

use crate::domain::entities::{DomainCount, NewLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable storage for short links and per-owner domain counts.
///
/// This is the authoritative store behind every cache in the service.
/// All methods must be safe to call concurrently, including for the same key.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-process maps behind a reader/writer lock
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link unless its code is already taken.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if a row was inserted
    /// - `Ok(false)` if the code already existed (the existing row wins)
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on storage errors.
    async fn save(&self, new_link: NewLink) -> Result<bool, AppError>;

    /// Finds the newest code for a long URL that is still live at `now`.
    ///
    /// Expired copies are skipped even if the sweeper has not removed them.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on storage errors.
    async fn get_code(
        &self,
        long_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, AppError>;

    /// Finds a link by its short code.
    ///
    /// Expired links are returned as-is; callers decide visibility.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on storage errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Lists every link owned by `owner_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on storage errors.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<ShortLink>, AppError>;

    /// Deletes a link if it belongs to `owner_id`.
    ///
    /// Returns `Ok(true)` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on storage errors.
    async fn delete(&self, owner_id: i64, code: &str) -> Result<bool, AppError>;

    /// Atomically inserts `(owner_id, domain)` with count 1 or increments it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on storage errors.
    async fn increment_domain_count(&self, owner_id: i64, domain: &str) -> Result<(), AppError>;

    /// Returns at most `limit` domain counts for an owner, ordered by count
    /// descending and then domain ascending.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on storage errors.
    async fn top_domains(&self, owner_id: i64, limit: i64)
    -> Result<Vec<DomainCount>, AppError>;

    /// Physically removes links whose expiry is at or before `now`.
    ///
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on storage errors.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;

    /// Checks if the storage backend is reachable.
    async fn health_check(&self) -> bool;
}
