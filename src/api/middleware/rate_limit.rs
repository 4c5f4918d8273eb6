//! Sliding-window rate limiting middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;

use crate::api::middleware::auth::AuthenticatedUser;
use crate::application::services::RateLimitDecision;
use crate::domain::principal::PrincipalKey;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Admits or rejects the request through [`crate::application::services::RateLimiter`].
///
/// Requests that passed [`super::auth::layer`] are counted per user; all
/// others per client IP. Must run after authentication, so routes apply it
/// with `route_layer` before the auth layer.
///
/// # Headers
///
/// Every response carries `X-RateLimit-Limit`, `X-RateLimit-Remaining` and
/// `X-RateLimit-Reset` (seconds until the current window ends). A denial is
/// `429 Too Many Requests` with `Retry-After` set to the same reset value.
///
/// # Example
///
/// ```rust,ignore
/// let public = Router::new()
///     .route("/{code}", get(redirect_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let principal = principal_for(&st, &req);
    let decision = st.rate_limiter.admit(&principal, st.clock.now()).await;

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        let mut denied = AppError::rate_limited(
            format!(
                "Rate limit exceeded. Try again in {} seconds.",
                decision.reset_in_seconds
            ),
            json!({ "limit": decision.limit, "reset_in_seconds": decision.reset_in_seconds }),
        )
        .into_response();
        denied
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(decision.reset_in_seconds));
        denied
    };

    apply_headers(response.headers_mut(), &decision);
    response
}

fn principal_for(st: &AppState, req: &Request) -> PrincipalKey {
    if let Some(AuthenticatedUser(user_id)) = req.extensions().get::<AuthenticatedUser>() {
        return PrincipalKey::User(*user_id);
    }

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    PrincipalKey::Ip(client_ip(req.headers(), peer, st.behind_proxy))
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(decision.reset_in_seconds));
}
