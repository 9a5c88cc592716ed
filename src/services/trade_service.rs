//! Buy / sell placeholders. Nothing is executed; the user only gets a
//! confirmation of what the order would have been.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn label(self) -> &'static str {
        match self {
            TradeSide::Buy => "Buy",
            TradeSide::Sell => "Sell",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeConfirmation {
    pub side: TradeSide,
    pub symbol: String,
    pub shares: u32,
    pub price: f64,
    pub total: f64,
}

impl TradeConfirmation {
    pub fn message(&self) -> String {
        format!(
            "{} {} shares of {} at ${:.2}",
            self.side.label(),
            self.shares,
            self.symbol,
            self.price
        )
    }
}

/// Share count from user input; anything missing, unparsable or zero is 1
pub fn parse_shares(arg: Option<&str>) -> u32 {
    arg.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|&shares| shares > 0)
        .unwrap_or(1)
}

pub fn confirm(side: TradeSide, symbol: &str, shares: u32, price: f64) -> TradeConfirmation {
    TradeConfirmation {
        side,
        symbol: symbol.to_uppercase(),
        shares,
        price,
        total: shares as f64 * price,
    }
}
