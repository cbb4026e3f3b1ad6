//! Watchlist synchronization and chart-data services for the BellaFi widget
//!
//! This crate holds the widget's state-consistency logic: the asset catalog
//! and its prefix search, the user's watchlist, market snapshot syncing, and
//! the chart session with request supersession.

pub mod catalog;
pub mod chart_session;
pub mod market_sync;
pub mod suggestions;
pub mod watchlist;
pub mod watchlist_service;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{AssetCatalog, CatalogError, MAX_SUGGESTIONS};
pub use chart_session::{
    ChartPhase, ChartSession, ChartState, DetailLoadError, LoadState, PendingLoad,
    SeriesLoadError,
};
pub use market_sync::{MarketDataSync, SyncError, SyncOrdering, SyncOutcome};
pub use suggestions::SuggestionEngine;
pub use watchlist::{Watchlist, DEFAULT_SEED};
pub use watchlist_service::{ServiceConfig, WatchlistRow, WatchlistService};
