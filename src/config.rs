use std::time::Duration;

use thiserror::Error;

use crate::api::TiingoClient;
use crate::models::WatchlistStock;

/// Upper bounds for numeric settings
const MAX_LOOKBACK_DAYS: u64 = 36_500;
const MAX_REFRESH_SECS: u64 = 86_400;
const MAX_LIVE_VIEW_TTL_SECS: u64 = 7 * 86_400;
const MAX_CHART_DIMENSION: u64 = 8_192;

const DEFAULT_WATCHLIST: &str = "AAPL:Apple Inc.,MSFT:Microsoft Corporation,GOOGL:Alphabet Inc.,AMZN:Amazon.com Inc.,META:Meta Platforms Inc.";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{key} must be a number between 1 and {max}, got '{value}'")]
    InvalidNumber { key: &'static str, value: String, max: u64 },
    #[error("Invalid watchlist entry '{0}', expected SYMBOL:Name")]
    InvalidWatchlist(String),
}

/// Runtime settings, read from the environment (and `.env`) at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub tiingo_api_token: String,
    pub tiingo_base_url: String,
    pub watchlist_url: Option<String>,
    pub watchlist: Vec<WatchlistStock>,
    pub history_lookback_days: i64,
    pub quote_refresh: Duration,
    pub chart_refresh: Duration,
    pub live_view_ttl: Duration,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let number = |key: &'static str, default: u64, max: u64| -> Result<u64, ConfigError> {
            match get(key) {
                None => Ok(default),
                Some(value) => match value.parse::<u64>() {
                    Ok(n) if (1..=max).contains(&n) => Ok(n),
                    _ => Err(ConfigError::InvalidNumber { key, value, max }),
                },
            }
        };
        let dimension = |key: &'static str, default: u64| -> Result<u32, ConfigError> {
            let n = number(key, default, MAX_CHART_DIMENSION)?;
            u32::try_from(n).map_err(|_| ConfigError::InvalidNumber {
                key,
                value: n.to_string(),
                max: MAX_CHART_DIMENSION,
            })
        };
        let lookback = number("HISTORY_LOOKBACK_DAYS", 1825, MAX_LOOKBACK_DAYS)?;

        let watchlist = parse_watchlist(&get("WATCHLIST").unwrap_or_else(|| DEFAULT_WATCHLIST.to_string()))?;

        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            tiingo_api_token: required("TIINGO_API_TOKEN")?,
            tiingo_base_url: get("TIINGO_BASE_URL")
                .unwrap_or_else(|| TiingoClient::DEFAULT_BASE_URL.to_string()),
            watchlist_url: get("WATCHLIST_URL"),
            watchlist,
            history_lookback_days: i64::try_from(lookback).map_err(|_| ConfigError::InvalidNumber {
                key: "HISTORY_LOOKBACK_DAYS",
                value: lookback.to_string(),
                max: MAX_LOOKBACK_DAYS,
            })?,
            quote_refresh: Duration::from_secs(number("QUOTE_REFRESH_SECS", 30, MAX_REFRESH_SECS)?),
            chart_refresh: Duration::from_secs(number("CHART_REFRESH_SECS", 60, MAX_REFRESH_SECS)?),
            live_view_ttl: Duration::from_secs(number("LIVE_VIEW_TTL_SECS", 900, MAX_LIVE_VIEW_TTL_SECS)?),
            chart_width: dimension("CHART_WIDTH", 1024)?,
            chart_height: dimension("CHART_HEIGHT", 600)?,
        })
    }

    pub fn tiingo_client(&self) -> TiingoClient {
        TiingoClient::with_base_url(self.tiingo_api_token.clone(), self.tiingo_base_url.clone())
            .with_watchlist_url(self.watchlist_url.clone())
            .with_default_watchlist(self.watchlist.clone())
            .with_history_lookback_days(self.history_lookback_days)
    }
}

/// Parse `SYM:Name,SYM:Name`; a bare `SYM` uses the symbol as its name
pub fn parse_watchlist(input: &str) -> Result<Vec<WatchlistStock>, ConfigError> {
    let mut watchlist = Vec::new();
    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (symbol, name) = match entry.split_once(':') {
            Some((symbol, name)) => (symbol.trim(), name.trim()),
            None => (entry, entry),
        };
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-') {
            return Err(ConfigError::InvalidWatchlist(entry.to_string()));
        }
        let symbol = symbol.to_uppercase();
        let name = if name.is_empty() { symbol.clone() } else { name.to_string() };
        watchlist.push(WatchlistStock::new(symbol, name));
    }
    Ok(watchlist)
}
