//! Time source port.
//!
//! Expiry checks, cache TTLs and rate-limit windows all read the current time
//! through [`Clock`] so tests can drive time explicitly. Implementations live
//! in [`crate::infrastructure::clock`].

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
