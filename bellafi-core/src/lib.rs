//! Core types for the BellaFi watchlist widget
//!
//! This crate defines the shared data structures used across the widget,
//! including asset records, market snapshots, chart series and the
//! provider abstraction the services are written against.

pub mod asset;
pub mod chart;
pub mod error;
pub mod market;
pub mod provider;

pub use asset::{normalize_id, AssetDetail, AssetRecord};
pub use chart::{ChartPoint, ChartRange, ChartSeries};
pub use error::{BellafiError, BellafiResult};
pub use market::{MarketQuote, MarketSnapshot, SnapshotEntry};
pub use provider::MarketDataProvider;
