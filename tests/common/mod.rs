#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

use hyperlink::application::services::auth_service::{generate_token, hash_token};
use hyperlink::application::services::{
    MetricsConfig, RateLimitConfig, RateLimitFailurePolicy, RedirectCacheConfig,
};
use hyperlink::domain::clock::Clock;
use hyperlink::domain::repositories::TokenRepository;
use hyperlink::infrastructure::cache::{CacheService, MemoryCache};
use hyperlink::infrastructure::clock::MockClock;
use hyperlink::infrastructure::counter::{
    CounterResult, CounterStore, CounterStoreError, MemoryCounterStore,
};
use hyperlink::infrastructure::persistence::{MemoryLinkRepository, MemoryTokenRepository};
use hyperlink::routes::build_router;
use hyperlink::state::{AppState, Backends, ServiceSettings};

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const BASE_URL: &str = "http://sho.rt";

/// A running router over in-memory stores.
pub struct TestApp {
    pub server: TestServer,
    pub clock: MockClock,
    pub links: Arc<MemoryLinkRepository>,
    pub tokens: Arc<MemoryTokenRepository>,
}

impl TestApp {
    /// Issues a fresh bearer token for `user_id` and returns the header value.
    pub async fn bearer_for(&self, user_id: i64) -> String {
        let token = generate_token();
        self.tokens
            .create_token(user_id, "test", &hash_token(SIGNING_SECRET, &token))
            .await
            .unwrap();
        format!("Bearer {token}")
    }
}

pub fn test_settings() -> ServiceSettings {
    ServiceSettings {
        base_url: BASE_URL.to_string(),
        token_signing_secret: SIGNING_SECRET.to_string(),
        behind_proxy: false,
        rate_limit: RateLimitConfig {
            window: Duration::from_secs(60),
            user_limit: 100,
            ip_limit: 100,
            failure_policy: RateLimitFailurePolicy::FailOpen,
            store_timeout: Duration::from_millis(250),
        },
        redirect_cache: RedirectCacheConfig::default(),
        metrics: MetricsConfig::default(),
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_settings(), None, None)
}

/// Builds the app, optionally swapping in a custom counter store or cache.
pub fn spawn_app_with(
    settings: ServiceSettings,
    counter_store: Option<Arc<dyn CounterStore>>,
    cache: Option<Arc<dyn CacheService>>,
) -> TestApp {
    let clock = MockClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap());
    let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());

    let links = Arc::new(MemoryLinkRepository::new(shared_clock.clone()));
    let tokens = Arc::new(MemoryTokenRepository::new(shared_clock.clone()));
    let counter_store: Arc<dyn CounterStore> = match counter_store {
        Some(store) => store,
        None => Arc::new(MemoryCounterStore::new(shared_clock.clone())),
    };
    let cache: Arc<dyn CacheService> = match cache {
        Some(cache) => cache,
        None => Arc::new(MemoryCache::new(shared_clock.clone())),
    };

    let state = AppState::new(
        Backends {
            link_repository: links.clone(),
            token_repository: tokens.clone(),
            counter_store,
            cache,
            clock: shared_clock,
        },
        settings,
    );

    TestApp {
        server: TestServer::new(build_router(state)).unwrap(),
        clock,
        links,
        tokens,
    }
}

/// Counter store whose backend is unreachable.
pub struct DownCounterStore;

#[async_trait]
impl CounterStore for DownCounterStore {
    async fn increment(&self, _key: &str) -> CounterResult<i64> {
        Err(CounterStoreError::Connection("connection refused".into()))
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> CounterResult<()> {
        Err(CounterStoreError::Connection("connection refused".into()))
    }

    async fn get(&self, _key: &str) -> CounterResult<Option<i64>> {
        Err(CounterStoreError::Connection("connection refused".into()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}
