//! Handlers for listing and deleting the caller's links.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;

use crate::api::dto::links::{LinkItem, LinksResponse};
use crate::api::middleware::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;

/// Lists every link owned by the caller, newest first.
///
/// # Endpoint
///
/// `GET /api/links`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> Result<Json<LinksResponse>, AppError> {
    let service = &state.shortening_service;
    let items: Vec<LinkItem> = service
        .links(user_id)
        .await?
        .into_iter()
        .map(|link| LinkItem {
            short_url: service.short_url(&link.code),
            code: link.code,
            long_url: link.long_url,
            created_at: link.created_at,
            expires_at: link.expires_at,
        })
        .collect();

    Ok(Json(LinksResponse {
        total: items.len(),
        items,
    }))
}

/// Deletes one of the caller's links.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// The cached redirect is evicted, so the code stops resolving immediately.
///
/// # Errors
///
/// Returns 404 Not Found if the code does not exist or belongs to someone else.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> Result<StatusCode, AppError> {
    if !state.shortening_service.delete(user_id, &code).await? {
        return Err(AppError::not_found(
            "Link not found",
            json!({ "code": code }),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}
