use chrono::NaiveDate;

use crate::models::{Allocation, Holding, PerformancePoint, PortfolioSummary, SeriesRequest, HistoricalPoint};

/// Account-level figures the mock holdings cannot produce (their average
/// price equals the current price)
const MOCK_DAY_CHANGE: f64 = 89.32;
const MOCK_DAY_CHANGE_PERCENT: f64 = 1.27;
const MOCK_TOTAL_GAIN_LOSS: f64 = 589.32;
const MOCK_TOTAL_GAIN_LOSS_PERCENT: f64 = 8.32;

/// Series name used when charting portfolio performance
pub const PERFORMANCE_SERIES: &str = "Value";

fn holding(symbol: &str, shares: u32, avg_price: f64, current_price: f64, value: f64) -> Holding {
    Holding {
        symbol: symbol.to_string(),
        shares,
        avg_price,
        current_price,
        value,
    }
}

/// Mock holdings shown on the portfolio page
pub fn mock_holdings() -> Vec<Holding> {
    vec![
        holding("AAPL", 10, 196.98, 196.98, 1969.80),
        holding("MSFT", 5, 367.78, 367.78, 1838.90),
        holding("GOOGL", 8, 151.16, 151.16, 1209.28),
        holding("AMZN", 12, 172.61, 172.61, 2071.32),
    ]
}

/// Mock portfolio value history
pub fn mock_performance() -> Vec<PerformancePoint> {
    [
        ((2025, 1, 20), 6500.0),
        ((2025, 2, 1), 6800.0),
        ((2025, 2, 15), 6600.0),
        ((2025, 3, 1), 7200.0),
        ((2025, 3, 15), 7100.0),
        ((2025, 4, 1), 7500.0),
        ((2025, 4, 20), 7089.0),
    ]
    .into_iter()
    .filter_map(|((y, m, d), value)| {
        NaiveDate::from_ymd_opt(y, m, d).map(|date| PerformancePoint { date, value })
    })
    .collect()
}

/// Performance history as a single chartable series
pub fn performance_series(points: &[PerformancePoint]) -> SeriesRequest {
    SeriesRequest::new(
        PERFORMANCE_SERIES,
        points
            .iter()
            .map(|p| HistoricalPoint {
                date: p.date,
                close: p.value,
            })
            .collect(),
    )
}

/// Totals derived from `holdings`; day change needs quote history and stays 0
pub fn summarize(holdings: &[Holding]) -> PortfolioSummary {
    let total_value: f64 = holdings.iter().map(|h| h.value).sum();
    let total_gain_loss: f64 = holdings.iter().map(Holding::gain_loss).sum();
    let cost_basis: f64 = holdings.iter().map(Holding::cost_basis).sum();

    let allocation = holdings
        .iter()
        .map(|h| Allocation {
            symbol: h.symbol.clone(),
            shares: h.shares,
            value: h.value,
            percent: if total_value > 0.0 {
                h.value / total_value * 100.0
            } else {
                0.0
            },
        })
        .collect();

    PortfolioSummary {
        total_value,
        day_change: 0.0,
        day_change_percent: 0.0,
        total_gain_loss,
        total_gain_loss_percent: if cost_basis > 0.0 {
            total_gain_loss / cost_basis * 100.0
        } else {
            0.0
        },
        positions: holdings.len(),
        allocation,
    }
}

/// Summary shown on the portfolio page: allocation and value come from the
/// holdings, day change and total gain/loss are mocked account figures
pub fn mock_summary(holdings: &[Holding]) -> PortfolioSummary {
    PortfolioSummary {
        day_change: MOCK_DAY_CHANGE,
        day_change_percent: MOCK_DAY_CHANGE_PERCENT,
        total_gain_loss: MOCK_TOTAL_GAIN_LOSS,
        total_gain_loss_percent: MOCK_TOTAL_GAIN_LOSS_PERCENT,
        ..summarize(holdings)
    }
}

/// `+$12.50` / `-$3.00`
pub fn format_signed_money(amount: f64) -> String {
    let sign = if amount >= 0.0 { "+" } else { "-" };
    format!("{}${:.2}", sign, amount.abs())
}

/// `+$12.50 (+1.27%)` style money change
pub fn format_money_change(amount: f64, percent: f64) -> String {
    let pct_sign = if percent >= 0.0 { "+" } else { "" };
    format!("{} ({}{:.2}%)", format_signed_money(amount), pct_sign, percent)
}
