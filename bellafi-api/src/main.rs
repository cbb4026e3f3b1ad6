//! BellaFi Watchlist API Server
//!
//! HTTP and WebSocket front for the watchlist widget, backed by CoinGecko.

mod config;
mod routes;

use bellafi_coingecko::CoinGeckoClient;
use bellafi_core::MarketDataProvider;
use bellafi_services::{ChartSession, WatchlistService};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WatchlistService>,
    pub chart: Arc<ChartSession>,
}

impl AppState {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: &AppConfig) -> Self {
        Self {
            service: Arc::new(WatchlistService::new(
                Arc::clone(&provider),
                config.service_config(),
            )),
            chart: Arc::new(ChartSession::new(provider)),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("info,bellafi_api=debug,bellafi_services=debug")
            }),
        )
        .init();

    info!("Starting BellaFi Watchlist API");

    let config = AppConfig::from_env()?;
    if config.coingecko.api_key.is_some() {
        info!("CoinGecko API key found in environment");
    }

    let client = CoinGeckoClient::with_config(config.coingecko.clone())?;
    info!("Using CoinGecko at {}", client.base_url());

    let state = AppState::new(Arc::new(client), &config);

    // Catalog load and initial sync run in background
    let service = Arc::clone(&state.service);
    tokio::spawn(async move {
        service.start().await;
        info!(
            "Watchlist ready: {} assets in catalog, {} tracked",
            service.catalog().len(),
            service.watchlist().len()
        );
    });

    if let Some(period) = config.refresh_interval {
        state.service.spawn_periodic_refresh(period);
    }

    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
