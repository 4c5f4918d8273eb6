//! Application layer services implementing business logic.
//!
//! Services consume repository and store traits and give HTTP handlers a
//! small API to call.
//!
//! # Available Services
//!
//! - [`services::rate_limiter::RateLimiter`] - Sliding-window admission control
//! - [`services::redirect_cache::RedirectCache`] - Read-through redirect resolution
//! - [`services::metrics_aggregator::MetricsAggregator`] - Cached per-owner domain metrics
//! - [`services::shortening_service::ShorteningService`] - URL normalization and code assignment
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
