//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::code_generator::is_valid_code;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Resolution goes through the redirect cache, falling back to durable
/// storage on a miss. Expired links are treated as unknown.
///
/// # Errors
///
/// Returns 404 Not Found if the code is malformed, unknown or expired.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    if !is_valid_code(&code) {
        return Err(not_found(&code));
    }

    let Some(long_url) = state.shortening_service.redirect(&code).await? else {
        debug!(code, "Unknown or expired short code");
        return Err(not_found(&code));
    };

    // Stored URLs may be raw unparseable input, so build the header by hand
    // and treat an unrepresentable value as missing.
    let location = HeaderValue::from_str(&long_url).map_err(|_| not_found(&code))?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "code": code }))
}
