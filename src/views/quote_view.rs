use std::sync::Arc;

use serenity::builder::CreateEmbed;
use tracing::debug;

use crate::api::MarketData;
use crate::models::{QuoteSummary, StockQuote};
use crate::services::market_service::format_percent;
use crate::services::quote_service::{self, format_change, format_number, format_price};
use crate::utils::{Fenced, Table};

/// Watchlist table, refreshed as a whole
pub struct WatchlistView<A> {
    api: Arc<A>,
    state: Fenced<Vec<QuoteSummary>>,
}

impl<A: MarketData> WatchlistView<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Fenced::new(),
        }
    }

    /// `None` when a newer refresh has started in the meantime
    pub async fn refresh(&self) -> Option<Vec<QuoteSummary>> {
        let ticket = self.state.begin();
        let rows = quote_service::load_watchlist(self.api.as_ref()).await;
        if self.state.publish(ticket, rows.clone()) {
            Some(rows)
        } else {
            debug!("Discarding stale watchlist refresh");
            None
        }
    }
}

/// Quote of one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct DetailSnapshot {
    pub symbol: String,
    pub quote: Option<StockQuote>,
}

pub struct DetailView<A> {
    api: Arc<A>,
    symbol: String,
    state: Fenced<DetailSnapshot>,
}

impl<A: MarketData> DetailView<A> {
    pub fn new(api: Arc<A>, symbol: &str) -> Self {
        Self {
            api,
            symbol: symbol.to_uppercase(),
            state: Fenced::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub async fn refresh(&self) -> Option<DetailSnapshot> {
        let ticket = self.state.begin();
        let quote = quote_service::load_quote(self.api.as_ref(), &self.symbol).await;
        let snapshot = DetailSnapshot {
            symbol: self.symbol.clone(),
            quote,
        };
        if self.state.publish(ticket, snapshot.clone()) {
            Some(snapshot)
        } else {
            debug!("Discarding stale quote refresh for {}", self.symbol);
            None
        }
    }
}

pub fn watchlist_table(rows: &[QuoteSummary]) -> String {
    if rows.is_empty() {
        return "No stocks in watchlist".to_string();
    }

    let mut table = Table::new(&["Symbol", "Price", "Change", "Change %"]);
    for row in rows {
        table.add_row(vec![
            row.symbol.clone(),
            format_price(row.last),
            format_change(row.change),
            format_percent(row.change_percent),
        ]);
    }
    table.render()
}

pub fn watchlist_embed(rows: &[QuoteSummary]) -> CreateEmbed {
    CreateEmbed::default()
        .title("📋 Watchlist")
        .description(watchlist_table(rows))
        .color(0x82ca9d)
}

/// Fields of the detail page as (name, value) pairs
pub fn detail_fields(quote: &StockQuote) -> Vec<(&'static str, String)> {
    let (change, change_percent) = quote_service::quote_change(quote);
    let range = match (quote.low, quote.high) {
        (Some(low), Some(high)) => format!("{} - {}", format_price(Some(low)), format_price(Some(high))),
        _ => "N/A".to_string(),
    };

    vec![
        ("Price", format_price(quote.last_price())),
        ("Change", format!("{} ({})", format_change(change), format_percent(change_percent))),
        ("Open", format_price(quote.open)),
        ("Previous Close", format_price(quote.prev_close)),
        ("Day's Range", range),
        (
            "Volume",
            quote
                .volume
                .map(|v| format_number(v as f64, 0))
                .unwrap_or_else(|| "N/A".to_string()),
        ),
    ]
}

pub fn detail_embed(snapshot: &DetailSnapshot) -> CreateEmbed {
    let embed = CreateEmbed::default().title(format!("🏷️ {}", snapshot.symbol));

    match &snapshot.quote {
        None => embed.description("Stock data not available").color(0xff0000),
        Some(quote) => {
            let (change, _) = quote_service::quote_change(quote);
            let color = if change >= 0.0 { 0x00c49f } else { 0xff8042 };
            detail_fields(quote)
                .into_iter()
                .fold(embed, |embed, (name, value)| embed.field(name, value, true))
                .color(color)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::{HistoricalPoint, WatchlistStock};

    #[test]
    fn table_shows_missing_prices() {
        let rows = vec![
            QuoteSummary {
                symbol: "AAPL".into(),
                name: "Apple Inc.".into(),
                last: Some(196.98),
                change: 2.71,
                change_percent: 1.39,
            },
            QuoteSummary {
                symbol: "MSFT".into(),
                name: "Microsoft Corporation".into(),
                last: None,
                change: 0.0,
                change_percent: 0.0,
            },
        ];
        let table = watchlist_table(&rows);
        assert!(table.contains("AAPL   | $196.98 |  +2.71 |   +1.39%"));
        assert!(table.contains("MSFT   |     N/A |  +0.00 |   +0.00%"));
        assert_eq!(watchlist_table(&[]), "No stocks in watchlist");
    }

    #[test]
    fn detail_fields_format_quote() {
        let quote = StockQuote {
            ticker: "AAPL".into(),
            tngo_last: Some(196.98),
            prev_close: Some(194.27),
            open: Some(195.0),
            high: Some(198.83),
            low: Some(194.42),
            volume: Some(51_334_000),
            ..StockQuote::default()
        };
        let fields = detail_fields(&quote);
        assert_eq!(fields[0], ("Price", "$196.98".to_string()));
        assert_eq!(fields[1], ("Change", "+2.71 (+1.39%)".to_string()));
        assert_eq!(fields[4], ("Day's Range", "$194.42 - $198.83".to_string()));
        assert_eq!(fields[5], ("Volume", "51,334,000".to_string()));

        let empty = detail_fields(&StockQuote::default());
        assert_eq!(empty[0].1, "N/A");
        assert_eq!(empty[4].1, "N/A");
    }

    struct StubApi;

    impl MarketData for StubApi {
        async fn fetch_stock_quote(&self, symbol: &str) -> Result<Vec<StockQuote>, ApiError> {
            if symbol == "ZZZZ" {
                return Err(ApiError::NotFound("unknown ticker".into()));
            }
            Ok(vec![StockQuote {
                ticker: symbol.to_string(),
                tngo_last: Some(10.0),
                ..StockQuote::default()
            }])
        }

        async fn fetch_historical_data(&self, _symbol: &str) -> Result<Vec<HistoricalPoint>, ApiError> {
            Ok(Vec::new())
        }

        async fn fetch_watchlist(&self) -> Result<Vec<WatchlistStock>, ApiError> {
            Ok(vec![WatchlistStock::new("AAPL", "Apple Inc.")])
        }
    }

    #[tokio::test]
    async fn detail_view_publishes_quote_or_placeholder() {
        let api = Arc::new(StubApi);
        let view = DetailView::new(api.clone(), "aapl");
        let snapshot = view.refresh().await.unwrap();
        assert_eq!(snapshot.symbol, "AAPL");
        assert_eq!(snapshot.quote.and_then(|q| q.last_price()), Some(10.0));

        let missing = DetailView::new(api, "ZZZZ").refresh().await.unwrap();
        assert_eq!(missing.quote, None);
    }

    #[tokio::test]
    async fn watchlist_view_loads_rows() {
        let view = WatchlistView::new(Arc::new(StubApi));
        let rows = view.refresh().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].last, Some(10.0));
    }
}
