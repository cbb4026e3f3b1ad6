//! Watchlist Service
//!
//! Owns the widget's watchlist-side state (catalog, watchlist, suggestions,
//! market snapshot) and wires mutations to snapshot refreshes.

use bellafi_core::{AssetRecord, MarketDataProvider, MarketSnapshot, SnapshotEntry};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::{AssetCatalog, CatalogError};
use crate::market_sync::{MarketDataSync, SyncOrdering, SyncOutcome};
use crate::suggestions::SuggestionEngine;
use crate::watchlist::{Watchlist, DEFAULT_SEED};

/// Configuration for [`WatchlistService`]
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Ids the watchlist starts with
    pub seed: Vec<String>,
    /// How overlapping snapshot syncs are reconciled
    pub sync_ordering: SyncOrdering,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED.iter().map(|s| s.to_string()).collect(),
            sync_ordering: SyncOrdering::default(),
        }
    }
}

/// One watchlist line joined with its market data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchlistRow {
    pub id: String,
    /// `None` while the provider has not returned data for the id
    pub entry: Option<SnapshotEntry>,
}

impl WatchlistRow {
    /// Whether the row should still show a loading placeholder
    pub fn is_loading(&self) -> bool {
        !self.entry.as_ref().map(SnapshotEntry::has_price).unwrap_or(false)
    }
}

/// Application context for the watchlist panel
pub struct WatchlistService {
    provider: Arc<dyn MarketDataProvider>,
    catalog: Arc<AssetCatalog>,
    watchlist: RwLock<Watchlist>,
    /// Publishes membership on every change, independent of snapshot syncs
    watchlist_tx: watch::Sender<Vec<String>>,
    suggestions: SuggestionEngine,
    sync: Arc<MarketDataSync>,
}

/// A sync whose sequence number was taken together with its id list
struct IssuedSync {
    seq: u64,
    ids: Vec<String>,
}

impl WatchlistService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: ServiceConfig) -> Self {
        let catalog = Arc::new(AssetCatalog::new());
        let sync = Arc::new(MarketDataSync::new(Arc::clone(&provider), config.sync_ordering));
        let watchlist = Watchlist::with_seed(&config.seed);
        let (watchlist_tx, _) = watch::channel(watchlist.ids());

        Self {
            provider,
            suggestions: SuggestionEngine::new(Arc::clone(&catalog)),
            catalog,
            watchlist: RwLock::new(watchlist),
            watchlist_tx,
            sync,
        }
    }

    /// Load the catalog and run the initial sync for the seeded watchlist
    ///
    /// Both run concurrently; failures are logged and leave the widget in
    /// its degraded state (no suggestions, no prices).
    pub async fn start(&self) {
        let issued = self.issue_sync(&self.watchlist.read());
        let (catalog_result, sync_outcome) =
            tokio::join!(self.load_catalog(), self.sync.sync_issued(issued.seq, &issued.ids));

        if let Err(e) = catalog_result {
            warn!("Suggestions unavailable: {}", e);
        }
        debug!("Initial market sync: {:?}", sync_outcome);
    }

    /// Load the asset catalog
    pub async fn load_catalog(&self) -> Result<usize, CatalogError> {
        self.catalog.load(self.provider.as_ref()).await
    }

    // =========================================================================
    // Watchlist mutations
    // =========================================================================

    /// Track an asset from free-text input
    ///
    /// Clears the search input and suggestions either way. On success a
    /// snapshot sync is spawned for the new membership.
    pub fn add(&self, raw_input: &str) -> bool {
        let issued = {
            let mut watchlist = self.watchlist.write();
            watchlist
                .add(raw_input)
                .then(|| self.publish_and_issue(&watchlist))
        };

        self.suggestions.clear();

        match issued {
            Some(issued) => {
                info!("Added '{}' to watchlist", raw_input.trim());
                self.spawn_sync(issued);
                true
            }
            None => false,
        }
    }

    /// Stop tracking an asset; spawns a snapshot sync if anything changed
    pub fn remove(&self, id: &str) -> bool {
        let issued = {
            let mut watchlist = self.watchlist.write();
            watchlist
                .remove(id)
                .then(|| self.publish_and_issue(&watchlist))
        };

        match issued {
            Some(issued) => {
                info!("Removed '{}' from watchlist", id);
                self.spawn_sync(issued);
                true
            }
            None => false,
        }
    }

    /// Publish the new membership and issue its sync; caller holds the write lock
    fn publish_and_issue(&self, watchlist: &Watchlist) -> IssuedSync {
        let issued = self.issue_sync(watchlist);
        self.watchlist_tx.send_replace(issued.ids.clone());
        issued
    }

    /// Take a sequence number for the current membership
    ///
    /// Empty membership is not issued; the sync is skipped later anyway.
    fn issue_sync(&self, watchlist: &Watchlist) -> IssuedSync {
        let ids = watchlist.ids();
        let seq = if ids.is_empty() { 0 } else { self.sync.issue() };
        IssuedSync { seq, ids }
    }

    fn spawn_sync(&self, issued: IssuedSync) -> JoinHandle<SyncOutcome> {
        let sync = Arc::clone(&self.sync);
        tokio::spawn(async move { sync.sync_issued(issued.seq, &issued.ids).await })
    }

    /// Re-sync the snapshot for the current watchlist
    pub async fn refresh(&self) -> SyncOutcome {
        let issued = self.issue_sync(&self.watchlist.read());
        self.sync.sync_issued(issued.seq, &issued.ids).await
    }

    /// Refresh the snapshot on a fixed interval until the handle is aborted
    pub fn spawn_periodic_refresh(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let service = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; the initial sync is done by `start`
            ticker.tick().await;

            info!("Periodic market refresh every {:?}", period);
            loop {
                ticker.tick().await;
                let outcome = service.refresh().await;
                debug!("Periodic market refresh: {:?}", outcome);
            }
        })
    }

    // =========================================================================
    // Search input
    // =========================================================================

    /// Recompute suggestions for the current input text
    pub fn on_input_changed(&self, text: &str) -> Vec<AssetRecord> {
        self.suggestions.on_input_changed(text)
    }

    /// Fill the input with a suggestion's id (does not add it)
    pub fn select_suggestion(&self, id: &str) -> String {
        self.suggestions.select(id)
    }

    pub fn input(&self) -> String {
        self.suggestions.input()
    }

    pub fn suggestions(&self) -> Vec<AssetRecord> {
        self.suggestions.suggestions()
    }

    // =========================================================================
    // Read model
    // =========================================================================

    /// Tracked ids in display order
    pub fn watchlist(&self) -> Vec<String> {
        self.watchlist.read().ids()
    }

    /// Receiver notified whenever the tracked ids change
    pub fn subscribe_watchlist(&self) -> watch::Receiver<Vec<String>> {
        self.watchlist_tx.subscribe()
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        self.sync.snapshot()
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<MarketSnapshot> {
        self.sync.subscribe()
    }

    /// Watchlist ids joined with the current snapshot, in watchlist order
    pub fn rows(&self) -> Vec<WatchlistRow> {
        let snapshot = self.sync.snapshot();
        self.watchlist
            .read()
            .iter()
            .map(|id| WatchlistRow {
                id: id.to_string(),
                entry: snapshot.get(id).cloned(),
            })
            .collect()
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn sync_ordering(&self) -> SyncOrdering {
        self.sync.ordering()
    }
}

impl std::fmt::Debug for WatchlistService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchlistService")
            .field("watchlist", &self.watchlist.read().ids())
            .field("catalog_len", &self.catalog.len())
            .field("sync", &self.sync)
            .finish()
    }
}
