//! Provider abstraction the services are written against

use async_trait::async_trait;

use crate::{AssetRecord, BellafiResult, ChartRange, ChartSeries, MarketQuote};

/// Upstream market data source
///
/// Implemented by the CoinGecko client; tests substitute scripted providers.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Full universe of known assets
    async fn list_assets(&self) -> BellafiResult<Vec<AssetRecord>>;

    /// Batched market quotes for the given ids
    ///
    /// Ids the provider has no data for are absent from the result.
    async fn market_quotes(&self, ids: &[String]) -> BellafiResult<Vec<MarketQuote>>;

    /// Historical price series for one asset over a range
    async fn market_chart(&self, id: &str, range: ChartRange) -> BellafiResult<ChartSeries>;
}
