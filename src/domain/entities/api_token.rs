//! API token entity.

use chrono::{DateTime, Utc};

/// A bearer token issued to a user.
///
/// Only the HMAC of the raw token is stored; the raw value is shown once at
/// creation time.
#[derive(Debug, Clone)]
pub struct ApiToken {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiToken {
    /// Returns true if the token can no longer authenticate.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}
