//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{
    AuthService, MetricsAggregator, MetricsConfig, RateLimitConfig, RateLimiter, RedirectCache,
    RedirectCacheConfig, ShorteningService,
};
use crate::config::Config;
use crate::domain::clock::Clock;
use crate::domain::repositories::{LinkRepository, TokenRepository};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::counter::CounterStore;

/// State cloned into each request. Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub shortening_service: Arc<ShorteningService>,
    pub auth_service: Arc<AuthService>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Kept alongside the services for health probes.
    pub link_repository: Arc<dyn LinkRepository>,
    pub counter_store: Arc<dyn CounterStore>,
    pub cache: Arc<dyn CacheService>,
    pub clock: Arc<dyn Clock>,
    /// Read client IPs from `X-Forwarded-For` for anonymous rate limiting.
    pub behind_proxy: bool,
}

/// Storage backends the services are built on.
pub struct Backends {
    pub link_repository: Arc<dyn LinkRepository>,
    pub token_repository: Arc<dyn TokenRepository>,
    pub counter_store: Arc<dyn CounterStore>,
    pub cache: Arc<dyn CacheService>,
    pub clock: Arc<dyn Clock>,
}

/// Service tuning extracted from [`Config`].
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub token_signing_secret: String,
    pub behind_proxy: bool,
    pub rate_limit: RateLimitConfig,
    pub redirect_cache: RedirectCacheConfig,
    pub metrics: MetricsConfig,
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            token_signing_secret: config.token_signing_secret.clone(),
            behind_proxy: config.behind_proxy,
            rate_limit: config.rate_limit_config(),
            redirect_cache: config.redirect_cache_config(),
            metrics: config.metrics_config(),
        }
    }
}

impl AppState {
    /// Builds the service graph on top of `backends`.
    pub fn new(backends: Backends, settings: ServiceSettings) -> Self {
        let Backends {
            link_repository,
            token_repository,
            counter_store,
            cache,
            clock,
        } = backends;

        let metrics = Arc::new(MetricsAggregator::new(
            cache.clone(),
            link_repository.clone(),
            settings.metrics,
        ));
        let redirects = Arc::new(RedirectCache::new(
            cache.clone(),
            link_repository.clone(),
            metrics.clone(),
            clock.clone(),
            settings.redirect_cache,
        ));
        let shortening_service = Arc::new(ShorteningService::new(
            redirects,
            metrics,
            clock.clone(),
            settings.base_url,
        ));
        let auth_service = Arc::new(AuthService::new(
            token_repository,
            settings.token_signing_secret,
        ));
        let rate_limiter = Arc::new(RateLimiter::new(
            counter_store.clone(),
            settings.rate_limit,
        ));

        Self {
            shortening_service,
            auth_service,
            rate_limiter,
            link_repository,
            counter_store,
            cache,
            clock,
            behind_proxy: settings.behind_proxy,
        }
    }
}
