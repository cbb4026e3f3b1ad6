//! Asset catalog records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market::MarketQuote;

/// A known asset from the provider's catalog
///
/// Records are immutable once loaded; `id` is the stable lowercase catalog key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Stable catalog key (e.g., "bitcoin")
    pub id: String,
    /// Ticker symbol (e.g., "btc")
    pub symbol: String,
    /// Human-readable name (e.g., "Bitcoin")
    pub name: String,
}

impl AssetRecord {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
        }
    }

    /// Label used when listing the asset as a suggestion, e.g. "Bitcoin (BTC)"
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.symbol.to_uppercase())
    }
}

/// Normalize free-text user input into a watchlist id (trim + lowercase)
pub fn normalize_id(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Header stats for an open chart: the single-asset market quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDetail {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent_24h: Option<Decimal>,
}

impl AssetDetail {
    /// Title shown above the chart, e.g. "Bitcoin (BTC)"
    pub fn title(&self) -> String {
        format!("{} ({})", self.name, self.symbol.to_uppercase())
    }
}

impl From<MarketQuote> for AssetDetail {
    fn from(quote: MarketQuote) -> Self {
        Self {
            id: quote.id,
            name: quote.name,
            symbol: quote.symbol,
            current_price: quote.current_price,
            change_percent_24h: quote.price_change_percentage_24h,
        }
    }
}
