//! Handler for the top domains endpoint.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use validator::Validate;

use crate::api::dto::metrics::{MetricsQuery, MetricsResponse};
use crate::api::middleware::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the domains the caller shortens most often.
///
/// # Endpoint
///
/// `GET /api/metrics?n=3`
///
/// `n` defaults to 3 and must be between 1 and 100.
///
/// # Response
///
/// ```json
/// { "domains": [ { "domain": "example.com", "count": 12 } ] }
/// ```
pub async fn top_domains_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<MetricsResponse>, AppError> {
    query.validate()?;

    let domains = state
        .shortening_service
        .top_domains(user_id, query.limit())
        .await?;

    Ok(Json(MetricsResponse {
        domains: domains.into_iter().map(Into::into).collect(),
    }))
}
