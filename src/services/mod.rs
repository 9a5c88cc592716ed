pub mod chart_service;
pub mod market_service;
pub mod portfolio_service;
pub mod quote_service;
pub mod series_service;
pub mod trade_service;
