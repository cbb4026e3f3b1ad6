//! Search-as-you-type endpoints

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use bellafi_core::AssetRecord;
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    /// Current search input
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionView {
    pub id: String,
    pub label: String,
}

impl From<AssetRecord> for SuggestionView {
    fn from(record: AssetRecord) -> Self {
        Self {
            label: record.display_label(),
            id: record.id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub input: String,
    pub suggestions: Vec<SuggestionView>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub id: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/suggestions", get(get_suggestions))
        .route("/suggestions/select", post(select_suggestion))
}

async fn get_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionsQuery>,
) -> Json<SuggestionsResponse> {
    let suggestions = state.service.on_input_changed(&params.q);
    Json(SuggestionsResponse {
        input: params.q,
        suggestions: suggestions.into_iter().map(Into::into).collect(),
    })
}

/// Fill the input with the chosen id; adding is a separate request
async fn select_suggestion(
    State(state): State<AppState>,
    Json(req): Json<SelectRequest>,
) -> Json<SuggestionsResponse> {
    let input = state.service.select_suggestion(&req.id);
    Json(SuggestionsResponse {
        input,
        suggestions: Vec::new(),
    })
}
