//! Scripted provider for unit tests
//!
//! Responses can be held back on oneshot gates so a test decides the order
//! in which concurrent requests complete.

use async_trait::async_trait;
use bellafi_core::{
    AssetRecord, BellafiError, BellafiResult, ChartPoint, ChartRange, ChartSeries,
    MarketDataProvider, MarketQuote,
};
use chrono::DateTime;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListAssets,
    Quotes(Vec<String>),
    Chart(String, ChartRange),
}

#[derive(Default)]
pub struct MockProvider {
    assets: Mutex<Vec<AssetRecord>>,
    assets_error: Mutex<Option<BellafiError>>,
    quotes: Mutex<HashMap<String, MarketQuote>>,
    quotes_error: Mutex<Option<BellafiError>>,
    quote_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    chart_errors: Mutex<HashMap<(String, ChartRange), BellafiError>>,
    chart_gates: Mutex<HashMap<(String, ChartRange), oneshot::Receiver<()>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assets(self, assets: Vec<AssetRecord>) -> Self {
        *self.assets.lock() = assets;
        self
    }

    pub fn with_quotes(self, quotes: Vec<MarketQuote>) -> Self {
        {
            let mut map = self.quotes.lock();
            for quote in quotes {
                map.insert(quote.id.clone(), quote);
            }
        }
        self
    }

    pub fn set_quote(&self, quote: MarketQuote) {
        self.quotes.lock().insert(quote.id.clone(), quote);
    }

    pub fn fail_assets(&self, err: Option<BellafiError>) {
        *self.assets_error.lock() = err;
    }

    pub fn fail_quotes(&self, err: Option<BellafiError>) {
        *self.quotes_error.lock() = err;
    }

    pub fn fail_chart(&self, id: &str, range: ChartRange, err: BellafiError) {
        self.chart_errors.lock().insert((id.to_string(), range), err);
    }

    /// Hold the next `market_quotes` call until the returned sender fires
    pub fn hold_next_quotes(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.quote_gates.lock().push_back(rx);
        tx
    }

    /// Hold the next `market_chart` call for (id, range) until the returned sender fires
    pub fn hold_chart(&self, id: &str, range: ChartRange) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.chart_gates.lock().insert((id.to_string(), range), rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn quote_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::Quotes(_)))
            .count()
    }
}

/// Deterministic series for a range: one point whose price is the range's position + 1
pub fn sample_series(range: ChartRange) -> ChartSeries {
    let position = ChartRange::ALL.iter().position(|r| *r == range).unwrap_or(0);
    ChartSeries::new(vec![ChartPoint {
        timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        price: Decimal::from(position as i64 + 1),
    }])
}

pub fn asset(id: &str, symbol: &str, name: &str) -> AssetRecord {
    AssetRecord::new(id, symbol, name)
}

pub fn quote(id: &str, price: Decimal) -> MarketQuote {
    MarketQuote {
        id: id.to_string(),
        symbol: id.chars().take(3).collect(),
        name: id.to_string(),
        current_price: Some(price),
        image: Some(format!("https://img.example/{}.png", id)),
        price_change_percentage_24h: None,
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn list_assets(&self) -> BellafiResult<Vec<AssetRecord>> {
        self.calls.lock().push(Call::ListAssets);
        if let Some(err) = self.assets_error.lock().clone() {
            return Err(err);
        }
        Ok(self.assets.lock().clone())
    }

    async fn market_quotes(&self, ids: &[String]) -> BellafiResult<Vec<MarketQuote>> {
        self.calls.lock().push(Call::Quotes(ids.to_vec()));

        let gate = self.quote_gates.lock().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if let Some(err) = self.quotes_error.lock().clone() {
            return Err(err);
        }

        let quotes = self.quotes.lock();
        Ok(ids.iter().filter_map(|id| quotes.get(id).cloned()).collect())
    }

    async fn market_chart(&self, id: &str, range: ChartRange) -> BellafiResult<ChartSeries> {
        self.calls.lock().push(Call::Chart(id.to_string(), range));

        let key = (id.to_string(), range);
        let gate = self.chart_gates.lock().remove(&key);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if let Some(err) = self.chart_errors.lock().get(&key).cloned() {
            return Err(err);
        }

        Ok(sample_series(range))
    }
}
