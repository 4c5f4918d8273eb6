//! Distributed sliding-window rate limiter.
//!
//! Each principal gets one counter per fixed window, stored in a shared
//! [`CounterStore`]. A request is judged against a blend of the current
//! window's count and the previous window's count, weighted by how much of
//! the previous window still overlaps a sliding window ending now:
//!
//! ```text
//! blended = previous * (1 - elapsed_fraction) + current
//! ```
//!
//! This approximates a true sliding log with two counters per principal and
//! no cross-request locking.

use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::principal::PrincipalKey;
use crate::infrastructure::counter::{CounterResult, CounterStore, CounterStoreError};

/// What to do when the counter store cannot be reached in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateLimitFailurePolicy {
    /// Admit the request.
    #[default]
    FailOpen,
    /// Deny the request.
    FailClosed,
}

impl FromStr for RateLimitFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::FailOpen),
            "closed" => Ok(Self::FailClosed),
            other => Err(format!(
                "invalid rate limit failure mode '{other}', expected 'open' or 'closed'"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub user_limit: u32,
    pub ip_limit: u32,
    pub failure_policy: RateLimitFailurePolicy,
    pub store_timeout: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            user_limit: 10,
            ip_limit: 30,
            failure_policy: RateLimitFailurePolicy::FailOpen,
            store_timeout: Duration::from_millis(250),
        }
    }
}

/// Outcome of a single admission check.
///
/// `limit`, `remaining` and `reset_in_seconds` are filled in for denied
/// requests too, so callers can always report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_in_seconds: u64,
}

/// Weighted request count over a sliding window.
///
/// `elapsed_fraction` is the position inside the current window, in `[0, 1)`.
pub fn blend(previous: i64, current: i64, elapsed_fraction: f64) -> f64 {
    previous as f64 * (1.0 - elapsed_fraction) + current as f64
}

/// Counter key for a principal in a given window.
pub fn window_key(principal: &PrincipalKey, window_index: i64) -> String {
    format!("rate:{principal}:{window_index}")
}

pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Request allowance per window for `principal`.
    pub fn limit_for(&self, principal: &PrincipalKey) -> u32 {
        if principal.is_authenticated() {
            self.config.user_limit
        } else {
            self.config.ip_limit
        }
    }

    /// Counts the request against `principal` and decides whether to admit it.
    ///
    /// The current window's counter is incremented even when the request is
    /// denied, so retrying while limited keeps the principal limited.
    pub async fn admit(&self, principal: &PrincipalKey, now: DateTime<Utc>) -> RateLimitDecision {
        let limit = self.limit_for(principal);
        let window_ms = (self.config.window.as_millis() as i64).max(1);
        let now_ms = now.timestamp_millis();
        let window_index = now_ms.div_euclid(window_ms);
        let elapsed_ms = now_ms.rem_euclid(window_ms);
        let reset_in_seconds = ((window_ms / 1000) - (elapsed_ms / 1000)).max(0) as u64;

        let current_key = window_key(principal, window_index);
        let previous_key = window_key(principal, window_index - 1);

        let (current, previous) = tokio::join!(
            self.bounded(
                self.store
                    .increment_with_expiry(&current_key, self.config.window * 2)
            ),
            self.bounded(self.store.get(&previous_key)),
        );

        let (current, previous) = match (current, previous) {
            (Ok(current), Ok(previous)) => (current, previous.unwrap_or(0)),
            (Err(e), _) | (_, Err(e)) => {
                return self.on_store_failure(principal, limit, reset_in_seconds, &e);
            }
        };

        let elapsed_fraction = elapsed_ms as f64 / window_ms as f64;
        let blended = blend(previous, current, elapsed_fraction);
        let allowed = blended <= f64::from(limit);
        let remaining = (f64::from(limit) - blended).max(0.0).floor() as u32;

        if !allowed {
            metrics::counter!("rate_limit_denied_total").increment(1);
            debug!(
                %principal,
                blended,
                limit,
                "Rate limit exceeded"
            );
        }

        RateLimitDecision {
            allowed,
            limit,
            remaining,
            reset_in_seconds,
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = CounterResult<T>>,
    ) -> CounterResult<T> {
        let timeout = self.config.store_timeout;
        tokio::time::timeout(timeout, call)
            .await
            .unwrap_or(Err(CounterStoreError::Timeout(timeout)))
    }

    fn on_store_failure(
        &self,
        principal: &PrincipalKey,
        limit: u32,
        reset_in_seconds: u64,
        error: &CounterStoreError,
    ) -> RateLimitDecision {
        metrics::counter!("rate_limit_store_failures_total").increment(1);

        let allowed = self.config.failure_policy == RateLimitFailurePolicy::FailOpen;
        warn!(
            %principal,
            error = %error,
            allowed,
            "Counter store unavailable, applying rate limit failure policy"
        );

        RateLimitDecision {
            allowed,
            limit,
            remaining: if allowed { limit } else { 0 },
            reset_in_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::Clock;
    use crate::infrastructure::clock::MockClock;
    use crate::infrastructure::counter::{MemoryCounterStore, MockCounterStore};
    use async_trait::async_trait;
    use chrono::TimeZone;

    fn window_start() -> DateTime<Utc> {
        // 2025-01-01T00:00:00Z is a multiple of 60s since the epoch.
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn limiter_with(clock: &MockClock, config: RateLimitConfig) -> RateLimiter {
        let store = Arc::new(MemoryCounterStore::new(Arc::new(clock.clone())));
        RateLimiter::new(store, config)
    }

    fn user() -> PrincipalKey {
        PrincipalKey::User(42)
    }

    #[test]
    fn test_failure_policy_from_str() {
        assert_eq!(
            "open".parse::<RateLimitFailurePolicy>().unwrap(),
            RateLimitFailurePolicy::FailOpen
        );
        assert_eq!(
            " Closed ".parse::<RateLimitFailurePolicy>().unwrap(),
            RateLimitFailurePolicy::FailClosed
        );
        assert!("maybe".parse::<RateLimitFailurePolicy>().is_err());
    }

    #[test]
    fn test_window_key_format() {
        assert_eq!(window_key(&user(), 7), "rate:user:42:7");
        assert_eq!(
            window_key(&PrincipalKey::Ip("1.2.3.4".into()), 7),
            "rate:ip:1.2.3.4:7"
        );
    }

    #[test]
    fn test_blend_is_monotonic_in_current() {
        let mut last = f64::MIN;
        for current in 0..50 {
            let value = blend(20, current, 0.4);
            assert!(value >= last);
            last = value;
        }
    }

    #[test]
    fn test_blend_weights_previous_window() {
        assert_eq!(blend(10, 0, 0.0), 10.0);
        assert_eq!(blend(10, 2, 0.5), 7.0);
        assert!(blend(10, 0, 0.999) < 0.1);
    }

    #[tokio::test]
    async fn test_exactly_limit_requests_admitted() {
        let clock = MockClock::new(window_start());
        let limiter = limiter_with(&clock, RateLimitConfig::default());

        let mut last_admitted = None;
        for _ in 0..10 {
            let decision = limiter.admit(&user(), clock.now()).await;
            assert!(decision.allowed);
            last_admitted = Some(decision);
        }
        let last_admitted = last_admitted.unwrap();
        assert!(last_admitted.remaining <= 1);

        let denied = limiter.admit(&user(), clock.now()).await;
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.limit, 10);
        assert_eq!(denied.reset_in_seconds, 60);
    }

    #[tokio::test]
    async fn test_anonymous_principals_use_ip_limit() {
        let clock = MockClock::new(window_start());
        let limiter = limiter_with(&clock, RateLimitConfig::default());
        let ip = PrincipalKey::Ip("203.0.113.7".into());

        for _ in 0..30 {
            assert!(limiter.admit(&ip, clock.now()).await.allowed);
        }
        let denied = limiter.admit(&ip, clock.now()).await;
        assert!(!denied.allowed);
        assert_eq!(denied.limit, 30);
    }

    #[tokio::test]
    async fn test_principals_are_independent() {
        let clock = MockClock::new(window_start());
        let limiter = limiter_with(&clock, RateLimitConfig::default());

        for _ in 0..11 {
            limiter.admit(&user(), clock.now()).await;
        }
        let other = limiter.admit(&PrincipalKey::User(43), clock.now()).await;
        assert!(other.allowed);
        assert_eq!(other.remaining, 9);
    }

    #[tokio::test]
    async fn test_remaining_never_increases_in_frozen_window() {
        let clock = MockClock::new(window_start() + chrono::Duration::seconds(20));
        let limiter = limiter_with(&clock, RateLimitConfig::default());

        let mut last = u32::MAX;
        for _ in 0..25 {
            let decision = limiter.admit(&user(), clock.now()).await;
            assert!(decision.remaining <= last);
            last = decision.remaining;
        }
        assert_eq!(last, 0);
    }

    #[tokio::test]
    async fn test_denied_requests_still_count() {
        let clock = MockClock::new(window_start());
        let store = Arc::new(MemoryCounterStore::new(Arc::new(clock.clone())));
        let limiter = RateLimiter::new(store.clone(), RateLimitConfig::default());

        for _ in 0..15 {
            limiter.admit(&user(), clock.now()).await;
        }

        let index = window_start().timestamp_millis() / 60_000;
        let stored = store.get(&window_key(&user(), index)).await.unwrap();
        assert_eq!(stored, Some(15));
    }

    #[tokio::test]
    async fn test_admitted_again_one_window_after_mid_window_burst() {
        let clock = MockClock::new(window_start() + chrono::Duration::seconds(30));
        let limiter = limiter_with(&clock, RateLimitConfig::default());

        for _ in 0..10 {
            assert!(limiter.admit(&user(), clock.now()).await.allowed);
        }
        assert!(!limiter.admit(&user(), clock.now()).await.allowed);

        // Half of the previous window's 11 hits still weigh in: 5.5 + 1.
        clock.advance(chrono::Duration::seconds(60));
        let decision = limiter.admit(&user(), clock.now()).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 3);
        assert_eq!(decision.reset_in_seconds, 30);
    }

    #[tokio::test]
    async fn test_always_admitted_two_windows_after_denial() {
        let clock = MockClock::new(window_start() + chrono::Duration::seconds(1));
        let limiter = limiter_with(&clock, RateLimitConfig::default());

        for _ in 0..40 {
            limiter.admit(&user(), clock.now()).await;
        }
        assert!(!limiter.admit(&user(), clock.now()).await.allowed);

        clock.advance(chrono::Duration::seconds(120));
        let decision = limiter.admit(&user(), clock.now()).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 9);
    }

    #[tokio::test]
    async fn test_heavy_previous_window_still_limits_early_in_next_window() {
        let clock = MockClock::new(window_start() + chrono::Duration::seconds(59));
        let limiter = limiter_with(&clock, RateLimitConfig::default());

        for _ in 0..20 {
            limiter.admit(&user(), clock.now()).await;
        }

        // Two seconds later the new window has barely started.
        clock.advance(chrono::Duration::seconds(2));
        assert!(!limiter.admit(&user(), clock.now()).await.allowed);
    }

    #[tokio::test]
    async fn test_fail_open_admits_on_store_error() {
        let mut store = MockCounterStore::new();
        store
            .expect_increment_with_expiry()
            .returning(|_, _| Err(CounterStoreError::Connection("refused".into())));
        store.expect_get().returning(|_| Ok(None));

        let limiter = RateLimiter::new(Arc::new(store), RateLimitConfig::default());
        let decision = limiter.admit(&user(), window_start()).await;

        assert!(decision.allowed);
        assert_eq!(decision.remaining, 10);
        assert_eq!(decision.limit, 10);
    }

    #[tokio::test]
    async fn test_fail_closed_denies_on_store_error() {
        let mut store = MockCounterStore::new();
        store.expect_increment_with_expiry().returning(|_, _| Ok(1));
        store
            .expect_get()
            .returning(|_| Err(CounterStoreError::Operation("WRONGTYPE".into())));

        let config = RateLimitConfig {
            failure_policy: RateLimitFailurePolicy::FailClosed,
            ..RateLimitConfig::default()
        };
        let limiter = RateLimiter::new(Arc::new(store), config);
        let decision = limiter.admit(&user(), window_start()).await;

        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    struct StalledStore;

    #[async_trait]
    impl CounterStore for StalledStore {
        async fn increment(&self, _key: &str) -> CounterResult<i64> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(1)
        }

        async fn expire(&self, _key: &str, _ttl: Duration) -> CounterResult<()> {
            Ok(())
        }

        async fn get(&self, _key: &str) -> CounterResult<Option<i64>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }

        async fn health_check(&self) -> bool {
            false
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_timeout_applies_failure_policy() {
        let config = RateLimitConfig {
            failure_policy: RateLimitFailurePolicy::FailClosed,
            ..RateLimitConfig::default()
        };
        let limiter = RateLimiter::new(Arc::new(StalledStore), config);

        let decision = limiter.admit(&user(), window_start()).await;
        assert!(!decision.allowed);
    }

    #[tokio::test]
    async fn test_counter_key_expires_after_two_windows() {
        let mut store = MockCounterStore::new();
        store
            .expect_increment_with_expiry()
            .withf(|key, ttl| key.starts_with("rate:user:42:") && *ttl == Duration::from_secs(120))
            .times(1)
            .returning(|_, _| Ok(1));
        store.expect_get().times(1).returning(|_| Ok(None));

        let limiter = RateLimiter::new(Arc::new(store), RateLimitConfig::default());
        assert!(limiter.admit(&user(), window_start()).await.allowed);
    }
}
