//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// A shortened URL owned by a user.
///
/// Links are never mutated after creation. A link whose `expires_at` lies in
/// the past is logically absent even while its row still exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub code: String,
    pub long_url: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(
        code: String,
        long_url: String,
        owner_id: i64,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            code,
            long_url,
            owner_id,
            created_at,
            expires_at,
        }
    }

    /// Returns true if the link has reached its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Time left until expiry, or `None` for links that never expire.
    ///
    /// Already expired links report a zero duration.
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at
            .map(|e| (e - now).to_std().unwrap_or(Duration::ZERO))
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub code: String,
    pub long_url: String,
    pub owner_id: i64,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn link_expiring(expires_at: Option<DateTime<Utc>>) -> ShortLink {
        ShortLink::new(
            "abc123".to_string(),
            "https://example.com".to_string(),
            7,
            Utc::now(),
            expires_at,
        )
    }

    #[test]
    fn test_link_without_expiry_never_expires() {
        let link = link_expiring(None);
        let far_future = Utc::now() + ChronoDuration::days(365 * 50);

        assert!(!link.is_expired_at(far_future));
        assert!(link.remaining_lifetime(far_future).is_none());
    }

    #[test]
    fn test_link_is_expired_at_boundary() {
        let expiry = Utc::now();
        let link = link_expiring(Some(expiry));

        assert!(!link.is_expired_at(expiry - ChronoDuration::seconds(1)));
        assert!(link.is_expired_at(expiry));
        assert!(link.is_expired_at(expiry + ChronoDuration::seconds(1)));
    }

    #[test]
    fn test_remaining_lifetime() {
        let now = Utc::now();
        let link = link_expiring(Some(now + ChronoDuration::minutes(5)));

        assert_eq!(
            link.remaining_lifetime(now),
            Some(Duration::from_secs(300))
        );
    }

    #[test]
    fn test_remaining_lifetime_saturates_at_zero() {
        let now = Utc::now();
        let link = link_expiring(Some(now - ChronoDuration::hours(1)));

        assert_eq!(link.remaining_lifetime(now), Some(Duration::ZERO));
    }
}
