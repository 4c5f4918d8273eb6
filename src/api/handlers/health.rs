//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};
use std::future::Future;
use std::time::Duration;

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "counter_store": { "status": "ok", "message": "Reachable" },
///     "cache": { "status": "ok", "message": "Reachable" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let (database, counter_store, cache) = tokio::join!(
        probe(state.link_repository.health_check()),
        probe(state.counter_store.health_check()),
        probe(state.cache.health_check()),
    );

    let checks = HealthChecks {
        database: CheckStatus::from_probe(database, "Connected", "Database unreachable"),
        counter_store: CheckStatus::from_probe(
            counter_store,
            "Reachable",
            "Counter store unreachable",
        ),
        cache: CheckStatus::from_probe(cache, "Reachable", "Cache unreachable"),
    };

    let all_healthy = checks.database.is_ok() && checks.counter_store.is_ok() && checks.cache.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn probe(check: impl Future<Output = bool>) -> bool {
    tokio::time::timeout(PROBE_TIMEOUT, check)
        .await
        .unwrap_or(false)
}
