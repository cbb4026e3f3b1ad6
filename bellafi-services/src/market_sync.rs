//! Market Data Sync
//!
//! Fetches a market snapshot for the tracked ids in one batched request and
//! republishes it on a watch channel. Failures keep the previous snapshot.

use bellafi_core::{BellafiError, MarketDataProvider, MarketSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// How results of overlapping syncs are reconciled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOrdering {
    /// Every successful result is published when it arrives, so a slow
    /// older sync can overwrite a newer one
    Unguarded,
    /// Only the most recently issued sync may publish; older results
    /// arriving late are dropped
    #[default]
    LatestIssued,
}

impl std::str::FromStr for SyncOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unguarded" => Ok(SyncOrdering::Unguarded),
            "latest" | "latest_issued" => Ok(SyncOrdering::LatestIssued),
            other => Err(format!("Unknown sync ordering: {}", other)),
        }
    }
}

/// Result of a triggered sync
#[derive(Debug)]
pub enum SyncOutcome {
    /// No ids to sync; nothing was requested and the snapshot is untouched
    Skipped,
    /// A new snapshot was published
    Applied { entries: usize },
    /// A newer sync was issued before this one completed; result dropped
    Superseded,
    /// The fetch failed; the previous snapshot was kept
    Failed(SyncError),
}

impl SyncOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, SyncOutcome::Applied { .. })
    }
}

/// Keeps the market snapshot for the watchlist up to date
pub struct MarketDataSync {
    provider: Arc<dyn MarketDataProvider>,
    ordering: SyncOrdering,
    /// Sequence number of the most recently issued sync
    issued: AtomicU64,
    snapshot_tx: watch::Sender<MarketSnapshot>,
}

impl MarketDataSync {
    pub fn new(provider: Arc<dyn MarketDataProvider>, ordering: SyncOrdering) -> Self {
        let (snapshot_tx, _) = watch::channel(MarketSnapshot::default());
        Self {
            provider,
            ordering,
            issued: AtomicU64::new(0),
            snapshot_tx,
        }
    }

    pub fn ordering(&self) -> SyncOrdering {
        self.ordering
    }

    /// Current snapshot
    pub fn snapshot(&self) -> MarketSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Receiver notified whenever a new snapshot is published
    pub fn subscribe(&self) -> watch::Receiver<MarketSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Fetch and build a snapshot without publishing it
    #[instrument(skip(self))]
    pub async fn fetch_snapshot(&self, ids: &[String]) -> Result<MarketSnapshot, SyncError> {
        let quotes = self.provider.market_quotes(ids).await?;
        Ok(MarketSnapshot::from_quotes(&quotes))
    }

    /// Reserve the sequence number for a sync about to be run
    ///
    /// Callers that decide the id list under their own lock should issue
    /// while still holding it and hand the number to [`Self::sync_issued`],
    /// so issue order matches membership order.
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Refresh the published snapshot for `ids`
    ///
    /// An empty id list skips the request and leaves the snapshot as it is.
    /// Errors are logged and swallowed into [`SyncOutcome::Failed`].
    pub async fn sync(&self, ids: &[String]) -> SyncOutcome {
        if ids.is_empty() {
            debug!("Watchlist is empty, skipping market sync");
            return SyncOutcome::Skipped;
        }

        let seq = self.issue();
        self.sync_issued(seq, ids).await
    }

    /// Run a sync under a sequence number obtained from [`Self::issue`]
    pub async fn sync_issued(&self, seq: u64, ids: &[String]) -> SyncOutcome {
        if ids.is_empty() {
            debug!("Watchlist is empty, skipping market sync #{}", seq);
            return SyncOutcome::Skipped;
        }

        debug!("Market sync #{} for {} ids", seq, ids.len());

        match self.fetch_snapshot(ids).await {
            Ok(snapshot) => {
                if self.ordering == SyncOrdering::LatestIssued
                    && self.issued.load(Ordering::SeqCst) != seq
                {
                    debug!("Dropping result of superseded market sync #{}", seq);
                    return SyncOutcome::Superseded;
                }

                let entries = snapshot.len();
                if entries < ids.len() {
                    debug!(
                        "Provider returned {} of {} requested ids",
                        entries,
                        ids.len()
                    );
                }

                self.snapshot_tx.send_replace(snapshot);
                info!("Market snapshot updated with {} entries", entries);
                SyncOutcome::Applied { entries }
            }
            Err(e) => {
                warn!("Market sync #{} failed, keeping previous snapshot: {}", seq, e);
                SyncOutcome::Failed(e)
            }
        }
    }
}

impl std::fmt::Debug for MarketDataSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataSync")
            .field("ordering", &self.ordering)
            .field("issued", &self.issued.load(Ordering::Relaxed))
            .finish()
    }
}

/// Errors from refreshing the market snapshot
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Market data fetch failed: {0}")]
    Fetch(#[from] BellafiError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{quote, Call, MockProvider};
    use rust_decimal_macros::dec;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn provider() -> Arc<MockProvider> {
        Arc::new(MockProvider::new().with_quotes(vec![
            quote("bitcoin", dec!(64000)),
            quote("ethereum", dec!(3100)),
        ]))
    }

    #[tokio::test]
    async fn test_sync_builds_snapshot() {
        let provider = provider();
        let sync = MarketDataSync::new(provider.clone(), SyncOrdering::default());

        let outcome = sync.sync(&ids(&["bitcoin", "ethereum"])).await;
        assert!(matches!(outcome, SyncOutcome::Applied { entries: 2 }));

        let snapshot = sync.snapshot();
        assert_eq!(snapshot.get("bitcoin").unwrap().price, Some(dec!(64000)));
        assert_eq!(provider.calls(), vec![Call::Quotes(ids(&["bitcoin", "ethereum"]))]);
    }

    #[tokio::test]
    async fn test_partial_response_omits_missing_ids() {
        let provider = Arc::new(MockProvider::new().with_quotes(vec![quote("bitcoin", dec!(1))]));
        let sync = MarketDataSync::new(provider, SyncOrdering::default());

        sync.sync(&ids(&["bitcoin", "ethereum"])).await;

        let snapshot = sync.snapshot();
        assert!(snapshot.contains("bitcoin"));
        assert!(!snapshot.contains("ethereum"));
    }

    #[tokio::test]
    async fn test_empty_ids_skip_request_and_keep_snapshot() {
        let provider = provider();
        let sync = MarketDataSync::new(provider.clone(), SyncOrdering::default());

        sync.sync(&ids(&["bitcoin"])).await;
        let before = sync.snapshot();

        assert!(matches!(sync.sync(&[]).await, SyncOutcome::Skipped));
        assert_eq!(provider.quote_calls(), 1);
        assert_eq!(sync.snapshot(), before);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_snapshot() {
        let provider = provider();
        let sync = MarketDataSync::new(provider.clone(), SyncOrdering::default());

        sync.sync(&ids(&["bitcoin"])).await;
        let before = sync.snapshot();

        provider.fail_quotes(Some(BellafiError::network("timeout")));
        let outcome = sync.sync(&ids(&["bitcoin", "ethereum"])).await;
        assert!(matches!(outcome, SyncOutcome::Failed(SyncError::Fetch(_))));
        assert_eq!(sync.snapshot(), before);

        // Not stuck: the next trigger succeeds again
        provider.fail_quotes(None);
        assert!(sync.sync(&ids(&["bitcoin", "ethereum"])).await.is_applied());
        assert_eq!(sync.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_is_replaced_not_merged() {
        let provider = provider();
        let sync = MarketDataSync::new(provider, SyncOrdering::default());

        sync.sync(&ids(&["bitcoin", "ethereum"])).await;
        sync.sync(&ids(&["ethereum"])).await;

        let snapshot = sync.snapshot();
        assert!(!snapshot.contains("bitcoin"));
        assert!(snapshot.contains("ethereum"));
    }

    /// Issue sync A ([bitcoin]) then sync B ([bitcoin, ethereum]); B completes first
    async fn run_out_of_order(ordering: SyncOrdering) -> (MarketSnapshot, SyncOutcome) {
        let provider = provider();
        let sync = Arc::new(MarketDataSync::new(provider.clone(), ordering));

        let gate_a = provider.hold_next_quotes();
        let sync_a = Arc::clone(&sync);
        let task_a = tokio::spawn(async move { sync_a.sync(&ids(&["bitcoin"])).await });

        // Let A issue its request before B
        while provider.quote_calls() < 1 {
            tokio::task::yield_now().await;
        }

        let outcome_b = sync.sync(&ids(&["bitcoin", "ethereum"])).await;
        assert!(outcome_b.is_applied());

        gate_a.send(()).unwrap();
        let outcome_a = task_a.await.unwrap();

        (sync.snapshot(), outcome_a)
    }

    #[tokio::test]
    async fn test_unguarded_late_result_overwrites() {
        let (snapshot, outcome_a) = run_out_of_order(SyncOrdering::Unguarded).await;

        assert!(outcome_a.is_applied());
        assert!(snapshot.contains("bitcoin"));
        assert!(!snapshot.contains("ethereum"));
    }

    #[tokio::test]
    async fn test_latest_issued_drops_late_result() {
        let (snapshot, outcome_a) = run_out_of_order(SyncOrdering::LatestIssued).await;

        assert!(matches!(outcome_a, SyncOutcome::Superseded));
        assert!(snapshot.contains("bitcoin"));
        assert!(snapshot.contains("ethereum"));
    }

    #[tokio::test]
    async fn test_issue_order_decides_not_start_order() {
        let provider = provider();
        let sync = MarketDataSync::new(provider.clone(), SyncOrdering::LatestIssued);

        let older = sync.issue();
        let newer = sync.issue();

        // The newer sync happens to start and finish first
        let outcome = sync.sync_issued(newer, &ids(&["bitcoin", "ethereum"])).await;
        assert!(outcome.is_applied());

        let outcome = sync.sync_issued(older, &ids(&["bitcoin"])).await;
        assert!(matches!(outcome, SyncOutcome::Superseded));
        assert!(sync.snapshot().contains("ethereum"));
    }

    #[tokio::test]
    async fn test_subscribers_see_new_snapshots() {
        let sync = MarketDataSync::new(provider(), SyncOrdering::default());
        let mut rx = sync.subscribe();

        sync.sync(&ids(&["ethereum"])).await;

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().contains("ethereum"));
    }

    #[test]
    fn test_ordering_from_str() {
        assert_eq!("unguarded".parse::<SyncOrdering>().unwrap(), SyncOrdering::Unguarded);
        assert_eq!("LATEST".parse::<SyncOrdering>().unwrap(), SyncOrdering::LatestIssued);
        assert!("fifo".parse::<SyncOrdering>().is_err());
    }
}
