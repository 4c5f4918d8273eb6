//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`] and are rate limited per user.

use crate::api::handlers::{
    delete_link_handler, list_links_handler, shorten_handler, top_domains_handler,
};
use crate::api::middleware::{auth, rate_limit};
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST   /shorten`        - Create a short link
/// - `GET    /metrics`        - Top domains for the caller
/// - `GET    /links`          - List the caller's links
/// - `DELETE /links/{code}`   - Delete one of the caller's links
///
/// Route layers run outside-in in reverse order of attachment, so auth
/// resolves the user before the limiter keys on it.
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/metrics", get(top_domains_handler))
        .route("/links", get(list_links_handler))
        .route("/links/{code}", delete(delete_link_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ))
        .route_layer(middleware::from_fn_with_state(state, auth::layer))
}
