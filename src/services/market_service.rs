use crate::models::{IndexLevel, MarketOverview, Mover};

/// Market overview cards of the dashboard; static figures, not fetched
pub fn mock_overview() -> MarketOverview {
    MarketOverview {
        indices: vec![
            IndexLevel { name: "S&P 500", level: 5234.18, change_percent: 0.42 },
            IndexLevel { name: "Dow Jones", level: 38671.69, change_percent: 0.35 },
            IndexLevel { name: "NASDAQ", level: 16498.24, change_percent: 0.58 },
        ],
        top_gainers: vec![
            Mover { symbol: "TSLA", change_percent: 8.24 },
            Mover { symbol: "NVDA", change_percent: 3.17 },
            Mover { symbol: "META", change_percent: 2.89 },
        ],
        top_losers: vec![
            Mover { symbol: "INTC", change_percent: -2.15 },
            Mover { symbol: "PFE", change_percent: -1.87 },
            Mover { symbol: "BAC", change_percent: -1.32 },
        ],
    }
}

/// Signed percentage, e.g. `+0.42%`
pub fn format_percent(change_percent: f64) -> String {
    if change_percent >= 0.0 {
        format!("+{:.2}%", change_percent)
    } else {
        format!("{:.2}%", change_percent)
    }
}

pub fn format_indices(overview: &MarketOverview) -> String {
    overview
        .indices
        .iter()
        .map(|index| {
            format!(
                "{}: {} ({})",
                index.name,
                crate::services::quote_service::format_number(index.level, 2),
                format_percent(index.change_percent)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_movers(movers: &[Mover]) -> String {
    movers
        .iter()
        .map(|mover| format!("{}: {}", mover.symbol, format_percent(mover.change_percent)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_overview_cards() {
        let overview = mock_overview();
        assert_eq!(
            format_indices(&overview).lines().next(),
            Some("S&P 500: 5,234.18 (+0.42%)")
        );
        assert_eq!(format_movers(&overview.top_gainers).lines().next(), Some("TSLA: +8.24%"));
        assert_eq!(format_movers(&overview.top_losers).lines().next(), Some("INTC: -2.15%"));
    }
}
