/// Health check endpoint
///
/// Reports process liveness and database reachability.
///
/// # Endpoint
///
/// - `GET /health`

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status ("ok" or "degraded")
    pub status: &'static str,

    /// Whether the database responded to a probe query
    pub database: bool,

    /// Server version
    pub version: &'static str,
}

/// Health check handler
///
/// Returns 200 when the database is reachable, 503 otherwise.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = chirp_shared::db::pool::health_check(&state.db).await.is_ok();

    let (status_code, status) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            database,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
