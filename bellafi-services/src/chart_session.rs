//! Chart Session
//!
//! Loads the historical series and header detail for the asset whose chart
//! is open, and reloads the series when the range changes.
//!
//! Every issued fetch carries a sequence number. A completion is applied
//! only if its number is still the session's current one for that portion,
//! so the last request issued wins regardless of arrival order, and
//! anything still in flight when the session closes is ignored.

use bellafi_core::{AssetDetail, BellafiError, ChartRange, ChartSeries, MarketDataProvider};
use futures::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Load status of one portion of the chart (series or detail)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum LoadState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Idle
    }
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

/// Overall session phase derived from the two portions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartPhase {
    Closed,
    Loading,
    Loaded,
    Error,
}

/// Snapshot of the chart session exposed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartState {
    /// Asset whose chart is open, `None` when closed
    pub asset_id: Option<String>,
    pub range: ChartRange,
    pub series: LoadState<ChartSeries>,
    pub detail: LoadState<AssetDetail>,
}

impl ChartState {
    pub fn is_open(&self) -> bool {
        self.asset_id.is_some()
    }

    /// Closed, or Loading while either portion is in flight
    ///
    /// Once both portions settle the session is Loaded unless both failed.
    /// A single failed portion renders degraded (no series data, or no
    /// header stats) rather than failing the whole session.
    pub fn phase(&self) -> ChartPhase {
        if !self.is_open() {
            return ChartPhase::Closed;
        }
        if self.series.is_loading() || self.detail.is_loading() {
            return ChartPhase::Loading;
        }
        if self.series.is_failed() && self.detail.is_failed() {
            return ChartPhase::Error;
        }
        ChartPhase::Loaded
    }

    /// Whether there are points to draw
    pub fn has_series_data(&self) -> bool {
        self.series.loaded().map(|s| !s.is_empty()).unwrap_or(false)
    }
}

/// Handles for the fetches a session operation issued
///
/// Dropping it detaches the fetches; they still complete and apply (or are
/// discarded) on their own.
#[derive(Debug)]
pub struct PendingLoad {
    handles: Vec<JoinHandle<()>>,
}

impl PendingLoad {
    /// Wait until every issued fetch has completed and been applied or discarded
    pub async fn finished(self) {
        for result in join_all(self.handles).await {
            if let Err(e) = result {
                warn!("Chart fetch task failed: {}", e);
            }
        }
    }
}

#[derive(Debug, Default)]
struct SessionInner {
    state: ChartState,
    series_seq: u64,
    detail_seq: u64,
}

struct Shared {
    inner: Mutex<SessionInner>,
    state_tx: watch::Sender<ChartState>,
}

impl Shared {
    /// Publish the current state; caller holds the lock
    fn publish(&self, inner: &SessionInner) {
        self.state_tx.send_replace(inner.state.clone());
    }

    fn apply_series(&self, seq: u64, result: Result<ChartSeries, BellafiError>) {
        let mut inner = self.inner.lock();
        if inner.series_seq != seq {
            debug!(
                "Discarding stale series response #{} (current #{})",
                seq, inner.series_seq
            );
            return;
        }

        inner.state.series = match result {
            Ok(series) => {
                debug!("Series #{} loaded with {} points", seq, series.len());
                LoadState::Loaded(series)
            }
            Err(e) => {
                let err = SeriesLoadError::from(e);
                warn!("{}", err);
                LoadState::Failed(err.to_string())
            }
        };
        self.publish(&inner);
    }

    fn apply_detail(&self, seq: u64, result: Result<AssetDetail, DetailLoadError>) {
        let mut inner = self.inner.lock();
        if inner.detail_seq != seq {
            debug!(
                "Discarding stale detail response #{} (current #{})",
                seq, inner.detail_seq
            );
            return;
        }

        inner.state.detail = match result {
            Ok(detail) => LoadState::Loaded(detail),
            Err(err) => {
                warn!("{}", err);
                LoadState::Failed(err.to_string())
            }
        };
        self.publish(&inner);
    }
}

/// The per-asset chart with its range selection
///
/// Operations return immediately; fetches run on spawned tasks, so a
/// Tokio runtime must be available.
pub struct ChartSession {
    provider: Arc<dyn MarketDataProvider>,
    shared: Arc<Shared>,
}

impl ChartSession {
    /// Create a closed session
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        let (state_tx, _) = watch::channel(ChartState::default());
        Self {
            provider,
            shared: Arc::new(Shared {
                inner: Mutex::new(SessionInner::default()),
                state_tx,
            }),
        }
    }

    /// Current state
    pub fn state(&self) -> ChartState {
        self.shared.inner.lock().state.clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ChartState> {
        self.shared.state_tx.subscribe()
    }

    /// Open the chart for an asset at the default range
    ///
    /// Issues the series and detail fetches concurrently. Opening while
    /// another asset is open replaces that session.
    pub fn open(&self, asset_id: &str) -> PendingLoad {
        let range = ChartRange::default();
        let (series_seq, detail_seq) = {
            let mut inner = self.shared.inner.lock();
            inner.series_seq += 1;
            inner.detail_seq += 1;
            inner.state = ChartState {
                asset_id: Some(asset_id.to_string()),
                range,
                series: LoadState::Loading,
                detail: LoadState::Loading,
            };
            self.shared.publish(&inner);
            (inner.series_seq, inner.detail_seq)
        };

        info!("Opening chart for {} ({})", asset_id, range);

        PendingLoad {
            handles: vec![
                self.spawn_series(asset_id.to_string(), range, series_seq),
                self.spawn_detail(asset_id.to_string(), detail_seq),
            ],
        }
    }

    /// Switch the range of the open chart and reload its series
    ///
    /// Returns `None` if the session is closed or the range is unchanged.
    /// Any series fetch still in flight for an earlier range is superseded.
    pub fn set_range(&self, range: ChartRange) -> Option<PendingLoad> {
        let (asset_id, seq) = {
            let mut inner = self.shared.inner.lock();
            let asset_id = inner.state.asset_id.clone()?;
            if inner.state.range == range {
                return None;
            }

            inner.series_seq += 1;
            inner.state.range = range;
            inner.state.series = LoadState::Loading;
            self.shared.publish(&inner);
            (asset_id, inner.series_seq)
        };

        debug!("Chart range for {} switched to {}", asset_id, range);

        Some(PendingLoad {
            handles: vec![self.spawn_series(asset_id, range, seq)],
        })
    }

    /// Re-issue both fetches for the current asset and range
    ///
    /// Returns `None` if the session is closed.
    pub fn reload(&self) -> Option<PendingLoad> {
        let (asset_id, range, series_seq, detail_seq) = {
            let mut inner = self.shared.inner.lock();
            let asset_id = inner.state.asset_id.clone()?;

            inner.series_seq += 1;
            inner.detail_seq += 1;
            inner.state.series = LoadState::Loading;
            inner.state.detail = LoadState::Loading;
            self.shared.publish(&inner);
            (asset_id, inner.state.range, inner.series_seq, inner.detail_seq)
        };

        debug!("Reloading chart for {} ({})", asset_id, range);

        Some(PendingLoad {
            handles: vec![
                self.spawn_series(asset_id.clone(), range, series_seq),
                self.spawn_detail(asset_id, detail_seq),
            ],
        })
    }

    /// Close the chart, discarding its data
    ///
    /// Fetches still in flight become no-ops when they complete.
    pub fn close(&self) {
        let mut inner = self.shared.inner.lock();
        if let Some(asset_id) = &inner.state.asset_id {
            info!("Closing chart for {}", asset_id);
        }

        inner.series_seq += 1;
        inner.detail_seq += 1;
        inner.state = ChartState::default();
        self.shared.publish(&inner);
    }

    fn spawn_series(&self, asset_id: String, range: ChartRange, seq: u64) -> JoinHandle<()> {
        let provider = Arc::clone(&self.provider);
        let shared = Arc::clone(&self.shared);

        tokio::spawn(async move {
            let result = provider.market_chart(&asset_id, range).await;
            shared.apply_series(seq, result);
        })
    }

    fn spawn_detail(&self, asset_id: String, seq: u64) -> JoinHandle<()> {
        let provider = Arc::clone(&self.provider);
        let shared = Arc::clone(&self.shared);

        tokio::spawn(async move {
            let result = fetch_detail(provider.as_ref(), &asset_id).await;
            shared.apply_detail(seq, result);
        })
    }
}

impl std::fmt::Debug for ChartSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartSession")
            .field("state", &self.shared.inner.lock().state)
            .finish()
    }
}

/// Single-id quote lookup used for the chart header
async fn fetch_detail(
    provider: &dyn MarketDataProvider,
    asset_id: &str,
) -> Result<AssetDetail, DetailLoadError> {
    let quotes = provider.market_quotes(&[asset_id.to_string()]).await?;
    quotes
        .into_iter()
        .find(|q| q.id == asset_id)
        .map(AssetDetail::from)
        .ok_or_else(|| DetailLoadError::Missing(asset_id.to_string()))
}

/// Errors from loading the chart series
#[derive(Debug, thiserror::Error)]
pub enum SeriesLoadError {
    #[error("Failed to load chart series: {0}")]
    Fetch(#[from] BellafiError),
}

/// Errors from loading the chart header detail
#[derive(Debug, thiserror::Error)]
pub enum DetailLoadError {
    #[error("Failed to load asset detail: {0}")]
    Fetch(#[from] BellafiError),

    #[error("No market data for {0}")]
    Missing(String),
}
