//! Watchlist endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use bellafi_services::{SyncOutcome, WatchlistRow};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error_response;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub ids: Vec<String>,
    pub rows: Vec<WatchlistRow>,
}

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct AddResponse {
    pub added: bool,
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub removed: bool,
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<SyncOutcome> for RefreshResponse {
    fn from(outcome: SyncOutcome) -> Self {
        match outcome {
            SyncOutcome::Skipped => Self {
                status: "skipped",
                entries: None,
                error: None,
            },
            SyncOutcome::Applied { entries } => Self {
                status: "applied",
                entries: Some(entries),
                error: None,
            },
            SyncOutcome::Superseded => Self {
                status: "superseded",
                entries: None,
                error: None,
            },
            SyncOutcome::Failed(e) => Self {
                status: "failed",
                entries: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Create watchlist routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/watchlist", get(get_watchlist).post(add_asset))
        .route("/watchlist/refresh", post(refresh))
        .route("/watchlist/{id}", delete(remove_asset))
}

/// Current watchlist joined with the market snapshot
async fn get_watchlist(State(state): State<AppState>) -> Json<WatchlistResponse> {
    Json(WatchlistResponse {
        ids: state.service.watchlist(),
        rows: state.service.rows(),
    })
}

/// Track an asset from raw input text
async fn add_asset(
    State(state): State<AppState>,
    Json(req): Json<AddRequest>,
) -> impl IntoResponse {
    if req.id.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Asset id must not be empty");
    }

    let added = state.service.add(&req.id);
    info!("Add '{}' -> {}", req.id, added);

    let code = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (
        code,
        Json(AddResponse {
            added,
            ids: state.service.watchlist(),
        }),
    )
        .into_response()
}

async fn remove_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let removed = state.service.remove(&id);
    if !removed {
        return error_response(StatusCode::NOT_FOUND, format!("Not in watchlist: {}", id));
    }

    Json(RemoveResponse {
        removed,
        ids: state.service.watchlist(),
    })
    .into_response()
}

/// Re-sync the market snapshot now
async fn refresh(State(state): State<AppState>) -> Json<RefreshResponse> {
    Json(state.service.refresh().await.into())
}
