use futures::future::join_all;
use tracing::warn;

use crate::api::MarketData;
use crate::models::{QuoteSummary, StockQuote, WatchlistStock};

/// Daily change and change percent of a quote.
///
/// No last price means no change; a missing or zero previous close is
/// treated as zero rather than producing NaN or infinity.
pub fn quote_change(quote: &StockQuote) -> (f64, f64) {
    let prev_close = quote.prev_close.unwrap_or(0.0);
    let change = match quote.last_price() {
        Some(last) if quote.prev_close.is_some() => last - prev_close,
        _ => 0.0,
    };
    let change_percent = if prev_close != 0.0 {
        change / prev_close * 100.0
    } else {
        0.0
    };
    (change, change_percent)
}

pub fn summarize(stock: &WatchlistStock, quote: Option<&StockQuote>) -> QuoteSummary {
    let (change, change_percent) = quote.map(quote_change).unwrap_or((0.0, 0.0));
    QuoteSummary {
        symbol: stock.symbol.clone(),
        name: stock.name.clone(),
        last: quote.and_then(StockQuote::last_price),
        change,
        change_percent,
    }
}

/// First quote snapshot for `symbol`, or `None` when the fetch failed or
/// returned nothing
pub async fn load_quote<A: MarketData>(api: &A, symbol: &str) -> Option<StockQuote> {
    match api.fetch_stock_quote(symbol).await {
        Ok(quotes) => quotes.into_iter().next(),
        Err(e) => {
            warn!("Error fetching quote for {}: {}", symbol, e);
            None
        }
    }
}

/// Load the watchlist and a quote for each entry concurrently.
/// A failed quote leaves that row without a price; a failed watchlist
/// yields an empty list.
pub async fn load_watchlist<A: MarketData>(api: &A) -> Vec<QuoteSummary> {
    let watchlist = match api.fetch_watchlist().await {
        Ok(watchlist) => watchlist,
        Err(e) => {
            warn!("Error loading watchlist: {}", e);
            return Vec::new();
        }
    };

    let rows = watchlist.iter().map(|stock| async move {
        let quote = load_quote(api, &stock.symbol).await;
        summarize(stock, quote.as_ref())
    });

    join_all(rows).await
}

/// `$1,234.56` style price, `N/A` when missing
pub fn format_price(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("${}", format_number(value, 2)),
        None => "N/A".to_string(),
    }
}

/// Signed change with two decimals, e.g. `+2.71` / `-0.40`
pub fn format_change(change: f64) -> String {
    if change >= 0.0 {
        format!("+{:.2}", change)
    } else {
        format!("{:.2}", change)
    }
}

/// Number with thousands separators and a fixed number of decimals
pub fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::HistoricalPoint;
    use std::collections::HashMap;

    fn quote(last: Option<f64>, prev_close: Option<f64>) -> StockQuote {
        StockQuote {
            ticker: "AAPL".to_string(),
            tngo_last: last,
            prev_close,
            ..StockQuote::default()
        }
    }

    #[test]
    fn change_from_previous_close() {
        let (change, pct) = quote_change(&quote(Some(110.0), Some(100.0)));
        assert!((change - 10.0).abs() < 1e-9);
        assert!((pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn missing_fields_mean_zero_change() {
        assert_eq!(quote_change(&quote(None, Some(100.0))), (0.0, 0.0));
        assert_eq!(quote_change(&quote(Some(100.0), None)), (0.0, 0.0));
        assert_eq!(quote_change(&quote(Some(100.0), Some(0.0))), (100.0, 0.0));
    }

    #[test]
    fn formats_numbers() {
        assert_eq!(format_price(Some(1969.8)), "$1,969.80");
        assert_eq!(format_price(None), "N/A");
        assert_eq!(format_number(51_334_000.0, 0), "51,334,000");
        assert_eq!(format_number(-1234.5, 2), "-1,234.50");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_change(2.714), "+2.71");
        assert_eq!(format_change(-0.4), "-0.40");
    }

    struct StubApi {
        quotes: HashMap<String, StockQuote>,
        watchlist: Result<Vec<WatchlistStock>, ApiError>,
    }

    impl MarketData for StubApi {
        async fn fetch_stock_quote(&self, symbol: &str) -> Result<Vec<StockQuote>, ApiError> {
            self.quotes
                .get(symbol)
                .map(|quote| vec![quote.clone()])
                .ok_or_else(|| ApiError::ServerError(500, "boom".into()))
        }

        async fn fetch_historical_data(&self, _symbol: &str) -> Result<Vec<HistoricalPoint>, ApiError> {
            Ok(Vec::new())
        }

        async fn fetch_watchlist(&self) -> Result<Vec<WatchlistStock>, ApiError> {
            self.watchlist.clone()
        }
    }

    #[tokio::test]
    async fn failed_quote_keeps_row_without_price() {
        let api = StubApi {
            quotes: HashMap::from([("AAPL".to_string(), quote(Some(110.0), Some(100.0)))]),
            watchlist: Ok(vec![
                WatchlistStock::new("AAPL", "Apple Inc."),
                WatchlistStock::new("MSFT", "Microsoft Corporation"),
            ]),
        };

        let rows = load_watchlist(&api).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].last, Some(110.0));
        assert_eq!(rows[1].symbol, "MSFT");
        assert_eq!(rows[1].last, None);
        assert_eq!(rows[1].change, 0.0);
    }

    #[tokio::test]
    async fn failed_watchlist_is_empty() {
        let api = StubApi {
            quotes: HashMap::new(),
            watchlist: Err(ApiError::Unauthorized("bad token".into())),
        };
        assert!(load_watchlist(&api).await.is_empty());
        assert_eq!(load_quote(&api, "AAPL").await, None);
    }
}
