//! CoinGecko API client
//!
//! Provides methods for the public endpoints the widget consumes. Coin ids
//! are appended to the request path as single percent-encoded segments.

use crate::config::{CoinGeckoConfig, API_KEY_HEADER};
use crate::types::{CoinListEntry, CoinMarket, MarketChartResponse};
use async_trait::async_trait;
use bellafi_core::{
    AssetRecord, BellafiError, ChartRange, ChartSeries, MarketDataProvider, MarketQuote,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

/// CoinGecko API client
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoClient {
    /// Create a client against the public API with default settings
    pub fn new() -> Result<Self, BellafiError> {
        Self::with_config(CoinGeckoConfig::default())
    }

    /// Create a client from an explicit configuration
    pub fn with_config(config: CoinGeckoConfig) -> Result<Self, BellafiError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BellafiError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.config.api_root()
    }

    /// Quote currency used for prices
    pub fn vs_currency(&self) -> &str {
        &self.config.vs_currency
    }

    /// Build an endpoint URL under the API root, one path segment per item
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BellafiError> {
        let mut url = Url::parse(self.config.api_root())
            .map_err(|e| BellafiError::config(format!("Invalid API root: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| BellafiError::config("API root cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.config.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// Send a request and decode the JSON body, mapping failures onto [`BellafiError`]
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, BellafiError> {
        let response = request
            .send()
            .await
            .map_err(|e| BellafiError::network(format!("Failed to fetch {}: {}", what, e)))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(BellafiError::not_found(format!("{} not found", what)));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BellafiError::api(format!(
                "CoinGecko API error ({}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BellafiError::parse(format!("Failed to parse {}: {}", what, e)))
    }

    /// List every coin the provider knows about
    #[instrument(skip(self))]
    pub async fn list_coins(&self) -> Result<Vec<AssetRecord>, BellafiError> {
        debug!("Fetching CoinGecko coin list");

        let request = self.get(self.endpoint(&["coins", "list"])?);
        let entries: Vec<CoinListEntry> = self.send_json(request, "coin list").await?;

        debug!("Fetched {} coins", entries.len());
        Ok(entries.into_iter().map(|e| e.to_asset_record()).collect())
    }

    /// Get market quotes for a batch of coin ids in one request
    #[instrument(skip(self))]
    pub async fn get_markets(&self, ids: &[String]) -> Result<Vec<MarketQuote>, BellafiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let csv = ids.join(",");
        debug!("Fetching CoinGecko markets for: {}", csv);

        let request = self.get(self.endpoint(&["coins", "markets"])?).query(&[
            ("vs_currency", self.config.vs_currency.as_str()),
            ("ids", csv.as_str()),
            ("order", "market_cap_desc"),
            ("sparkline", "false"),
        ]);

        let markets: Vec<CoinMarket> = self.send_json(request, "markets").await?;

        Ok(markets.into_iter().map(|m| m.to_market_quote()).collect())
    }

    /// Get the historical price series for a coin
    #[instrument(skip(self))]
    pub async fn get_market_chart(
        &self,
        id: &str,
        range: ChartRange,
    ) -> Result<ChartSeries, BellafiError> {
        // Dot segments would be dropped from the path rather than encoded
        if matches!(id, "" | "." | "..") {
            return Err(BellafiError::not_found(format!("Invalid coin id: '{}'", id)));
        }

        debug!("Fetching CoinGecko market chart for {} ({})", id, range);

        let url = self.endpoint(&["coins", id, "market_chart"])?;
        let request = self.get(url).query(&[
            ("vs_currency", self.config.vs_currency.as_str()),
            ("days", range.days_param()),
        ]);

        let response: MarketChartResponse = self.send_json(request, "market chart").await?;

        Ok(response.to_chart_series())
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn list_assets(&self) -> Result<Vec<AssetRecord>, BellafiError> {
        self.list_coins().await
    }

    async fn market_quotes(&self, ids: &[String]) -> Result<Vec<MarketQuote>, BellafiError> {
        self.get_markets(ids).await
    }

    async fn market_chart(&self, id: &str, range: ChartRange) -> Result<ChartSeries, BellafiError> {
        self.get_market_chart(id, range).await
    }
}

impl std::fmt::Debug for CoinGeckoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinGeckoClient")
            .field("base_url", &self.config.base_url)
            .field("vs_currency", &self.config.vs_currency)
            .field("authenticated", &self.config.api_key.is_some())
            .finish()
    }
}
