use std::future::Future;

use crate::models::{HistoricalPoint, StockQuote, WatchlistStock};

pub mod tiingo;

pub use tiingo::{ApiError, TiingoClient};

/// Source of quotes, daily history and the watchlist.
///
/// Every call may fail on its own; callers substitute an empty or placeholder
/// result for the failed symbol rather than aborting the whole view.
pub trait MarketData: Send + Sync {
    fn fetch_stock_quote(
        &self,
        symbol: &str,
    ) -> impl Future<Output = Result<Vec<StockQuote>, ApiError>> + Send;

    fn fetch_historical_data(
        &self,
        symbol: &str,
    ) -> impl Future<Output = Result<Vec<HistoricalPoint>, ApiError>> + Send;

    fn fetch_watchlist(&self) -> impl Future<Output = Result<Vec<WatchlistStock>, ApiError>> + Send;
}
