//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`      - Health check: database, counter store, cache (public)
//! - `GET  /{code}`      - Short link redirect (public, rate limited per IP)
//! - `/api/*`            - REST API (Bearer token required, rate limited per user)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Sliding window over the shared counter store
//! - **Authentication** - Bearer token
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state))
}

/// Routes and middleware without path normalization.
///
/// Integration tests drive this directly.
pub fn build_router(state: AppState) -> Router {
    let redirect_router = Router::new()
        .route("/{code}", get(redirect_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(redirect_router)
        .nest("/api", api::routes::protected_routes(state.clone()))
        .with_state(state)
        .layer(tracing::layer())
}
