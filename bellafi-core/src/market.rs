//! Market data structures: per-asset quotes and the watchlist snapshot

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A per-asset market quote as returned by the provider's markets endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    /// Catalog id the quote belongs to
    pub id: String,

    /// Ticker symbol
    pub symbol: String,

    /// Human-readable name
    pub name: String,

    /// Current price in the quote currency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Decimal>,

    /// URL to the asset's icon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Price change over the last 24 hours, in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_percentage_24h: Option<Decimal>,
}

/// Display data for one tracked asset inside a [`MarketSnapshot`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Current price; `None` renders as still loading
    pub price: Option<Decimal>,

    /// Icon URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// 24h change in percent, if the provider reported one
    pub change_percent_24h: Option<Decimal>,
}

impl SnapshotEntry {
    /// Whether the 24h change is strictly positive (zero counts as not positive)
    pub fn is_positive(&self) -> bool {
        self.change_percent_24h
            .map(|c| c > Decimal::ZERO)
            .unwrap_or(false)
    }

    /// Whether the entry has a price to show
    pub fn has_price(&self) -> bool {
        self.price.is_some()
    }
}

impl From<&MarketQuote> for SnapshotEntry {
    fn from(quote: &MarketQuote) -> Self {
        Self {
            price: quote.current_price,
            image_url: quote.image.clone(),
            change_percent_24h: quote.price_change_percentage_24h,
        }
    }
}

/// Point-in-time map of market data keyed by asset id
///
/// Rebuilt wholesale on every successful sync. Ids the provider did not
/// return are simply absent; nothing is synthesized for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    entries: IndexMap<String, SnapshotEntry>,

    /// When the snapshot was built (`None` for the initial empty snapshot)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl MarketSnapshot {
    /// Build a snapshot from a provider response
    ///
    /// Later records with the same id overwrite earlier ones.
    pub fn from_quotes(quotes: &[MarketQuote]) -> Self {
        let mut entries = IndexMap::with_capacity(quotes.len());
        for quote in quotes {
            entries.insert(quote.id.clone(), SnapshotEntry::from(quote));
        }

        Self {
            entries,
            fetched_at: Some(Utc::now()),
        }
    }

    pub fn get(&self, id: &str) -> Option<&SnapshotEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids present in the snapshot, in provider response order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SnapshotEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
