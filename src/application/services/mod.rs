//! Business logic services for the application layer.

pub mod auth_service;
pub mod metrics_aggregator;
pub mod rate_limiter;
pub mod redirect_cache;
pub mod shortening_service;

pub use auth_service::AuthService;
pub use metrics_aggregator::{MetricsAggregator, MetricsConfig};
pub use rate_limiter::{RateLimitConfig, RateLimitDecision, RateLimitFailurePolicy, RateLimiter};
pub use redirect_cache::{RedirectCache, RedirectCacheConfig};
pub use shortening_service::{ShortenOutcome, ShorteningService};
