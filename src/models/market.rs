//! Market overview models

/// Index level with its daily move
#[derive(Debug, Clone, PartialEq)]
pub struct IndexLevel {
    pub name: &'static str,
    pub level: f64,
    pub change_percent: f64,
}

/// Symbol with its daily move
#[derive(Debug, Clone, PartialEq)]
pub struct Mover {
    pub symbol: &'static str,
    pub change_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketOverview {
    pub indices: Vec<IndexLevel>,
    pub top_gainers: Vec<Mover>,
    pub top_losers: Vec<Mover>,
}
