//! Suggestion Engine
//!
//! Search-as-you-type over the asset catalog. Recomputed synchronously on
//! every input change; the last query is memoized.

use bellafi_core::AssetRecord;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::catalog::AssetCatalog;

#[derive(Debug, Default)]
struct SuggestionState {
    /// Current contents of the search input
    input: String,
    /// Suggestions for `input`
    suggestions: Vec<AssetRecord>,
    /// Whether `suggestions` were computed against a loaded catalog
    computed_with_catalog: bool,
}

/// Produces the bounded suggestion list for the search input
///
/// Selecting a suggestion fills the input with the chosen id and clears the
/// list; it never adds to the watchlist by itself.
#[derive(Debug)]
pub struct SuggestionEngine {
    catalog: Arc<AssetCatalog>,
    state: RwLock<SuggestionState>,
}

impl SuggestionEngine {
    pub fn new(catalog: Arc<AssetCatalog>) -> Self {
        Self {
            catalog,
            state: RwLock::new(SuggestionState::default()),
        }
    }

    /// Update the input text and return the matching suggestions
    pub fn on_input_changed(&self, text: &str) -> Vec<AssetRecord> {
        let catalog_loaded = self.catalog.is_loaded();

        {
            let state = self.state.read();
            if state.input == text && state.computed_with_catalog == catalog_loaded {
                return state.suggestions.clone();
            }
        }

        let suggestions = self.catalog.search(text);

        let mut state = self.state.write();
        state.input = text.to_string();
        state.suggestions = suggestions.clone();
        state.computed_with_catalog = catalog_loaded;
        suggestions
    }

    /// Pick a suggestion: the input becomes its id and the list is cleared
    pub fn select(&self, id: &str) -> String {
        let mut state = self.state.write();
        state.input = id.to_string();
        state.suggestions.clear();
        state.computed_with_catalog = false;
        state.input.clone()
    }

    /// Empty the input and the suggestion list
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.input.clear();
        state.suggestions.clear();
        state.computed_with_catalog = false;
    }

    pub fn input(&self) -> String {
        self.state.read().input.clone()
    }

    pub fn suggestions(&self) -> Vec<AssetRecord> {
        self.state.read().suggestions.clone()
    }
}
