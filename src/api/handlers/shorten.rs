//! Handler for link shortening endpoint.

use axum::{Extension, Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::middleware::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for the authenticated user.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/page", "expiry_days": 30 }
/// ```
///
/// # Response
///
/// `201 Created` for a new link, `200 OK` when the URL already had a live
/// code and that code is returned.
///
/// ```json
/// {
///   "code": "Xk3a9_Qe",
///   "short_url": "http://localhost:8080/Xk3a9_Qe",
///   "expires_at": "2025-02-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for an empty, oversized or non-HTTP(S) URL.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let outcome = state
        .shortening_service
        .shorten(&payload.url, user_id, payload.expiry_days)
        .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(ShortenResponse {
            short_url: state.shortening_service.short_url(&outcome.code),
            code: outcome.code,
            expires_at: outcome.expires_at,
        }),
    ))
}
