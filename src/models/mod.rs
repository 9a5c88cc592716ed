//! Data models for dashboard commands and services
//!
//! Wire models of the quote API, the merged chart table and the mock
//! portfolio / market figures shown on the pages.

pub mod market;
pub mod portfolio;
pub mod quote;
pub mod series;

// Re-export commonly used types for convenience
pub use market::{IndexLevel, MarketOverview, Mover};
pub use portfolio::{Allocation, Holding, PerformancePoint, PortfolioSummary};
pub use quote::{QuoteSummary, StockQuote, WatchlistStock};
pub use series::{AggregatedRow, ChartKind, ChartParams, HistoricalPoint, SeriesRequest, Timeframe};
