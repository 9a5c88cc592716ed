//! Quote and watchlist models

use serde::{Deserialize, Serialize};

/// Quote snapshot from the IEX endpoint. Tiingo leaves fields null outside
/// market hours, so every number is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    #[serde(default)]
    pub ticker: String,
    pub tngo_last: Option<f64>,
    pub last: Option<f64>,
    pub prev_close: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<i64>,
}

impl StockQuote {
    /// Tiingo's composite last price, falling back to the raw last trade
    pub fn last_price(&self) -> Option<f64> {
        self.tngo_last.or(self.last)
    }
}

/// Entry of the user's watchlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistStock {
    pub symbol: String,
    pub name: String,
}

impl WatchlistStock {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

/// A watchlist row with the values derived from its quote
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSummary {
    pub symbol: String,
    pub name: String,
    pub last: Option<f64>,
    pub change: f64,
    pub change_percent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_iex_payload_with_nulls() {
        let json = r#"[{
            "ticker": "AAPL",
            "timestamp": "2025-04-17T20:00:00+00:00",
            "tngoLast": 196.98,
            "last": null,
            "prevClose": 194.27,
            "open": 195.0,
            "high": 198.83,
            "low": 194.42,
            "mid": null,
            "volume": 51334000
        }]"#;
        let quotes: Vec<StockQuote> = serde_json::from_str(json).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].ticker, "AAPL");
        assert_eq!(quotes[0].last_price(), Some(196.98));
        assert_eq!(quotes[0].prev_close, Some(194.27));
        assert_eq!(quotes[0].volume, Some(51_334_000));
    }

    #[test]
    fn last_price_falls_back_to_last_trade() {
        let quote = StockQuote {
            last: Some(10.0),
            ..StockQuote::default()
        };
        assert_eq!(quote.last_price(), Some(10.0));
        assert_eq!(StockQuote::default().last_price(), None);
    }
}
