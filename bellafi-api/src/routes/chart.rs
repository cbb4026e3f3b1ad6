//! Chart session endpoints
//!
//! Mutating endpoints return immediately with the session state at the time
//! the fetches were issued; completion is observed via `GET /api/chart` or
//! the `/ws` push channel.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bellafi_core::{normalize_id, ChartRange};
use bellafi_services::{ChartPhase, ChartState};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error_response;
use crate::AppState;

/// Chart state plus its derived phase
#[derive(Debug, Serialize)]
pub struct ChartView {
    pub phase: ChartPhase,
    #[serde(flatten)]
    pub state: ChartState,
}

impl From<ChartState> for ChartView {
    fn from(state: ChartState) -> Self {
        Self {
            phase: state.phase(),
            state,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OpenRequest {
    pub asset_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RangeRequest {
    /// Range label ("1D", "1W", ...) or day code ("1", "7", "max", ...)
    pub range: String,
}

#[derive(Debug, Serialize)]
pub struct RangeOption {
    pub label: &'static str,
    pub days: &'static str,
    pub selected: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chart", get(get_chart))
        .route("/chart/open", post(open_chart))
        .route("/chart/range", post(set_range))
        .route("/chart/reload", post(reload_chart))
        .route("/chart/close", post(close_chart))
        .route("/chart/ranges", get(list_ranges))
}

async fn get_chart(State(state): State<AppState>) -> Json<ChartView> {
    Json(state.chart.state().into())
}

async fn open_chart(
    State(state): State<AppState>,
    Json(req): Json<OpenRequest>,
) -> impl IntoResponse {
    let asset_id = normalize_id(&req.asset_id);
    if asset_id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "asset_id must not be empty");
    }

    info!("Opening chart for {}", asset_id);
    // Fetches complete in the background
    drop(state.chart.open(&asset_id));
    (StatusCode::ACCEPTED, Json(ChartView::from(state.chart.state()))).into_response()
}

async fn set_range(
    State(state): State<AppState>,
    Json(req): Json<RangeRequest>,
) -> impl IntoResponse {
    let range: ChartRange = match req.range.parse() {
        Ok(range) => range,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    if !state.chart.state().is_open() {
        return error_response(StatusCode::CONFLICT, "No chart is open");
    }

    let status = match state.chart.set_range(range) {
        Some(_) => StatusCode::ACCEPTED,
        None => StatusCode::OK,
    };
    (status, Json(ChartView::from(state.chart.state()))).into_response()
}

/// Re-issue both fetches for the current asset and range
async fn reload_chart(State(state): State<AppState>) -> impl IntoResponse {
    match state.chart.reload() {
        Some(_) => {
            (StatusCode::ACCEPTED, Json(ChartView::from(state.chart.state()))).into_response()
        }
        None => error_response(StatusCode::CONFLICT, "No chart is open"),
    }
}

async fn close_chart(State(state): State<AppState>) -> Json<ChartView> {
    state.chart.close();
    Json(state.chart.state().into())
}

async fn list_ranges(State(state): State<AppState>) -> Json<Vec<RangeOption>> {
    let current = state.chart.state().range;
    Json(
        ChartRange::ALL
            .iter()
            .map(|range| RangeOption {
                label: range.label(),
                days: range.days_param(),
                selected: *range == current,
            })
            .collect(),
    )
}
