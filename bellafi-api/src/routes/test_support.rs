//! Router test helpers

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use bellafi_core::{
    AssetRecord, BellafiError, BellafiResult, ChartPoint, ChartRange, ChartSeries,
    MarketDataProvider, MarketQuote,
};
use bellafi_coingecko::CoinGeckoConfig;
use bellafi_services::{SyncOrdering, DEFAULT_SEED};
use chrono::DateTime;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::AppState;

/// Knows three assets but only quotes bitcoin; charts fail for "broken"
struct FixtureProvider;

#[async_trait]
impl MarketDataProvider for FixtureProvider {
    async fn list_assets(&self) -> BellafiResult<Vec<AssetRecord>> {
        Ok(vec![
            AssetRecord::new("bitcoin", "btc", "Bitcoin"),
            AssetRecord::new("ethereum", "eth", "Ethereum"),
            AssetRecord::new("solana", "sol", "Solana"),
        ])
    }

    async fn market_quotes(&self, ids: &[String]) -> BellafiResult<Vec<MarketQuote>> {
        Ok(ids
            .iter()
            .filter(|id| id.as_str() == "bitcoin")
            .map(|id| MarketQuote {
                id: id.clone(),
                symbol: "btc".to_string(),
                name: "Bitcoin".to_string(),
                current_price: Some(dec!(64000)),
                image: None,
                price_change_percentage_24h: Some(dec!(2.5)),
            })
            .collect())
    }

    async fn market_chart(&self, id: &str, _range: ChartRange) -> BellafiResult<ChartSeries> {
        if id == "broken" {
            return Err(BellafiError::api("500: upstream error"));
        }
        Ok(ChartSeries::new(vec![ChartPoint {
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            price: dec!(1),
        }]))
    }
}

/// State over the fixture provider with the catalog loaded and the seed synced
pub async fn test_state() -> AppState {
    let config = AppConfig {
        coingecko: CoinGeckoConfig::default(),
        seed: DEFAULT_SEED.iter().map(|s| s.to_string()).collect(),
        sync_ordering: SyncOrdering::LatestIssued,
        refresh_interval: None,
        port: 0,
    };
    let state = AppState::new(Arc::new(FixtureProvider), &config);
    state.service.start().await;
    state
}

/// Send one request through the full router and decode the JSON body
pub async fn request(
    state: &AppState,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = super::router(state.clone())
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body_json(&bytes))
}

fn body_json(bytes: &[u8]) -> serde_json::Value {
    if bytes.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
