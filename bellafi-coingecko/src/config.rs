//! CoinGecko client configuration

use bellafi_core::BellafiError;
use std::env;
use std::time::Duration;
use url::Url;

/// Base URL for the public CoinGecko API
pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// Header carrying a demo-plan API key
pub const API_KEY_HEADER: &str = "x-cg-demo-api-key";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`crate::CoinGeckoClient`]
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// Optional API key sent with every request
    pub api_key: Option<String>,
    /// Quote currency for prices (e.g., "usd")
    pub vs_currency: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: COINGECKO_API_BASE.to_string(),
            api_key: None,
            vs_currency: "usd".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl CoinGeckoConfig {
    /// Load configuration from environment variables
    ///
    /// Reads:
    /// - COINGECKO_BASE_URL: API root (defaults to the public API)
    /// - COINGECKO_API_KEY: optional demo API key
    /// - VS_CURRENCY: quote currency (defaults to "usd")
    pub fn from_env() -> Result<Self, BellafiError> {
        let mut config = Self::default();

        if let Ok(base_url) = env::var("COINGECKO_BASE_URL") {
            config.base_url = base_url;
        }

        config.api_key = env::var("COINGECKO_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        if let Ok(currency) = env::var("VS_CURRENCY") {
            config.vs_currency = currency.trim().to_lowercase();
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the base URL parses and the currency is set
    pub fn validate(&self) -> Result<(), BellafiError> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            BellafiError::config(format!("Invalid COINGECKO_BASE_URL '{}': {}", self.base_url, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(BellafiError::config(format!(
                "Unsupported scheme for COINGECKO_BASE_URL: {}",
                url.scheme()
            )));
        }

        if self.vs_currency.is_empty() {
            return Err(BellafiError::config("VS_CURRENCY must not be empty"));
        }

        Ok(())
    }

    /// Base URL with any trailing slash removed
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
