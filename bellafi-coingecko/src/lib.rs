//! CoinGecko integration for the BellaFi watchlist widget
//!
//! This crate provides a client for the public CoinGecko REST API: the
//! coin catalog, batched market quotes and historical market charts.

pub mod client;
pub mod config;
pub mod types;

pub use client::CoinGeckoClient;
pub use config::CoinGeckoConfig;
