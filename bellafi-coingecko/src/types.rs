//! CoinGecko API response types
//!
//! These types mirror the CoinGecko responses and are converted
//! to bellafi-core types for use in the services.

use bellafi_core::{AssetRecord, ChartPoint, ChartSeries, MarketQuote};
use chrono::DateTime;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

/// An entry from GET /coins/list
#[derive(Debug, Clone, Deserialize)]
pub struct CoinListEntry {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
}

impl CoinListEntry {
    pub fn to_asset_record(self) -> AssetRecord {
        AssetRecord {
            id: self.id,
            symbol: self.symbol,
            name: self.name,
        }
    }
}

/// An entry from GET /coins/markets
#[derive(Debug, Clone, Deserialize)]
pub struct CoinMarket {
    pub id: String,

    #[serde(default)]
    pub symbol: String,

    #[serde(default)]
    pub name: String,

    /// Icon URL
    #[serde(default)]
    pub image: Option<String>,

    /// Current price in the requested currency
    #[serde(default)]
    pub current_price: Option<f64>,

    /// 24h change in percent
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl CoinMarket {
    pub fn to_market_quote(self) -> MarketQuote {
        MarketQuote {
            id: self.id,
            symbol: self.symbol,
            name: self.name,
            current_price: to_decimal(self.current_price),
            image: self.image.filter(|url| !url.is_empty()),
            price_change_percentage_24h: to_decimal(self.price_change_percentage_24h),
        }
    }
}

/// Response from GET /coins/{id}/market_chart
///
/// Each sample is `[timestamp_millis, price]`. A response without
/// `prices` is an empty series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketChartResponse {
    #[serde(default)]
    pub prices: Vec<Vec<Option<f64>>>,
}

impl MarketChartResponse {
    /// Convert to a series, skipping malformed samples
    pub fn to_chart_series(self) -> ChartSeries {
        let total = self.prices.len();

        let points: Vec<ChartPoint> = self
            .prices
            .into_iter()
            .filter_map(|sample| {
                let (ts, price) = match sample.as_slice() {
                    [Some(ts), Some(price), ..] => (*ts, *price),
                    _ => return None,
                };
                let timestamp = DateTime::from_timestamp_millis(ts as i64)?;
                let price = Decimal::from_f64(price)?;
                Some(ChartPoint { timestamp, price })
            })
            .collect();

        if points.len() != total {
            debug!("Dropped {} malformed chart samples", total - points.len());
        }

        ChartSeries::new(points)
    }
}

/// Convert an optional provider float into a decimal
pub fn to_decimal(value: Option<f64>) -> Option<Decimal> {
    value.and_then(Decimal::from_f64)
}
