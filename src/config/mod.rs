use crate::error::{ChartServiceError, Result};
use std::env;

/// Upper bound on placeholder series length, from config or per request.
pub const MAX_SYNTHETIC_POINTS: usize = 5_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub yahoo_chart_url: String,
    pub yahoo_search_url: String,
    pub search_quotes_count: u32,
    pub request_timeout_secs: u64,
    pub search_debounce_ms: u64,
    pub synthetic_points: usize,
    pub default_symbol: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, falling back to defaults
    /// for anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ChartServiceError::Config("Invalid PORT".to_string()))?;

        let search_quotes_count = var("SEARCH_QUOTES_COUNT", "10")
            .parse::<u32>()
            .map_err(|_| ChartServiceError::Config("Invalid SEARCH_QUOTES_COUNT".to_string()))?;

        let request_timeout_secs = var("REQUEST_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|_| ChartServiceError::Config("Invalid REQUEST_TIMEOUT_SECS".to_string()))?;

        let search_debounce_ms = var("SEARCH_DEBOUNCE_MS", "300")
            .parse::<u64>()
            .map_err(|_| ChartServiceError::Config("Invalid SEARCH_DEBOUNCE_MS".to_string()))?;

        let synthetic_points = var("SYNTHETIC_POINTS", "100")
            .parse::<usize>()
            .map_err(|_| ChartServiceError::Config("Invalid SYNTHETIC_POINTS".to_string()))?;
        if !(1..=MAX_SYNTHETIC_POINTS).contains(&synthetic_points) {
            return Err(ChartServiceError::Config(format!(
                "SYNTHETIC_POINTS must be between 1 and {}",
                MAX_SYNTHETIC_POINTS
            )));
        }

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            yahoo_chart_url: var(
                "YAHOO_CHART_URL",
                "https://query1.finance.yahoo.com/v8/finance/chart",
            ),
            yahoo_search_url: var(
                "YAHOO_SEARCH_URL",
                "https://query2.finance.yahoo.com/v1/finance/search",
            ),
            search_quotes_count,
            request_timeout_secs,
            search_debounce_ms,
            synthetic_points,
            default_symbol: var("DEFAULT_SYMBOL", "AAPL"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.search_quotes_count, 10);
        assert_eq!(config.search_debounce_ms, 300);
        assert_eq!(config.synthetic_points, 100);
        assert_eq!(config.default_symbol, "AAPL");
        assert!(config.yahoo_chart_url.ends_with("/v8/finance/chart"));
    }

    #[test]
    fn overrides_are_read() {
        let config = config_with(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8081"),
            ("DEFAULT_SYMBOL", "MSFT"),
            ("SEARCH_DEBOUNCE_MS", "150"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8081");
        assert_eq!(config.default_symbol, "MSFT");
        assert_eq!(config.search_debounce_ms, 150);
    }

    #[test]
    fn invalid_numbers_are_config_errors() {
        let err = config_with(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ChartServiceError::Config(ref m) if m == "Invalid PORT"));

        let err = config_with(&[("SYNTHETIC_POINTS", "0")]).unwrap_err();
        assert!(matches!(err, ChartServiceError::Config(_)));

        let err = config_with(&[("SYNTHETIC_POINTS", "200000")]).unwrap_err();
        assert!(matches!(err, ChartServiceError::Config(ref m) if m.contains("5000")));

        let config = config_with(&[("SYNTHETIC_POINTS", "5000")]).unwrap();
        assert_eq!(config.synthetic_points, MAX_SYNTHETIC_POINTS);
    }
}
