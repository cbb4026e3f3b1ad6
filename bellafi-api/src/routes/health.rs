//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    catalog_loaded: bool,
    catalog_size: usize,
    tracked: usize,
    snapshot_entries: usize,
}

/// Health check handler; degraded until the asset catalog has loaded
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = state.service.catalog();
    let catalog_loaded = catalog.is_loaded();

    let response = HealthResponse {
        status: if catalog_loaded { "healthy" } else { "degraded" },
        catalog_loaded,
        catalog_size: catalog.len(),
        tracked: state.service.watchlist().len(),
        snapshot_entries: state.service.snapshot().len(),
    };

    let code = if catalog_loaded {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(response))
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}
