//! Server configuration from environment variables

use bellafi_coingecko::CoinGeckoConfig;
use bellafi_core::BellafiError;
use bellafi_services::{ServiceConfig, SyncOrdering, DEFAULT_SEED};
use std::time::Duration;

const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub coingecko: CoinGeckoConfig,
    pub seed: Vec<String>,
    pub sync_ordering: SyncOrdering,
    /// Periodic snapshot refresh; `None` disables it
    pub refresh_interval: Option<Duration>,
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// Reads:
    /// - COINGECKO_BASE_URL, COINGECKO_API_KEY, VS_CURRENCY (see [`CoinGeckoConfig`])
    /// - WATCHLIST_SEED: comma separated ids (default "bitcoin,ethereum")
    /// - SYNC_ORDERING: "unguarded" or "latest" (default "latest")
    /// - REFRESH_INTERVAL_SECS: periodic refresh, 0 or unset disables
    /// - SERVER_PORT: listen port (default 3001)
    pub fn from_env() -> Result<Self, BellafiError> {
        let coingecko = CoinGeckoConfig::from_env()?;
        Self::from_lookup(coingecko, |key| std::env::var(key).ok())
    }

    fn from_lookup<F>(coingecko: CoinGeckoConfig, lookup: F) -> Result<Self, BellafiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let seed = match lookup("WATCHLIST_SEED") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_SEED.iter().map(|s| s.to_string()).collect(),
        };

        let sync_ordering = match lookup("SYNC_ORDERING") {
            Some(raw) => raw.parse().map_err(BellafiError::config)?,
            None => SyncOrdering::default(),
        };

        let refresh_interval = match lookup("REFRESH_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    BellafiError::config(format!("Invalid REFRESH_INTERVAL_SECS: {}", raw))
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let port = match lookup("SERVER_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| BellafiError::config(format!("Invalid SERVER_PORT: {}", raw)))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            coingecko,
            seed,
            sync_ordering,
            refresh_interval,
            port,
        })
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            seed: self.seed.clone(),
            sync_ordering: self.sync_ordering,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, BellafiError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(CoinGeckoConfig::default(), |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.seed, vec!["bitcoin", "ethereum"]);
        assert_eq!(config.sync_ordering, SyncOrdering::LatestIssued);
        assert_eq!(config.refresh_interval, None);
        assert_eq!(config.port, 3001);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("WATCHLIST_SEED", "solana, ,dogecoin"),
            ("SYNC_ORDERING", "unguarded"),
            ("REFRESH_INTERVAL_SECS", "60"),
            ("SERVER_PORT", "8080"),
        ])
        .unwrap();

        assert_eq!(config.seed, vec!["solana", "dogecoin"]);
        assert_eq!(config.sync_ordering, SyncOrdering::Unguarded);
        assert_eq!(config.refresh_interval, Some(Duration::from_secs(60)));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_zero_interval_disables_refresh() {
        let config = load(&[("REFRESH_INTERVAL_SECS", "0")]).unwrap();
        assert_eq!(config.refresh_interval, None);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        for vars in [
            [("SYNC_ORDERING", "fifo")],
            [("REFRESH_INTERVAL_SECS", "soon")],
            [("SERVER_PORT", "99999")],
        ] {
            assert!(matches!(load(&vars), Err(BellafiError::Config(_))));
        }
    }
}
