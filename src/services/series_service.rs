use std::collections::BTreeMap;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::api::MarketData;
use crate::models::{AggregatedRow, SeriesRequest, Timeframe};

/// Named symbol groups offered by the chart selector
const PRESETS: &[(&str, &[&str])] = &[
    ("tech", &["AAPL", "MSFT", "GOOGL"]),
    ("faang", &["AAPL", "MSFT", "GOOGL", "AMZN", "META"]),
];

/// Parse a comma separated symbol list or a preset name.
/// Symbols are upper-cased and de-duplicated, keeping first occurrence.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, String> {
    let lowered = input.trim().to_lowercase();
    if let Some((_, symbols)) = PRESETS.iter().find(|(name, _)| *name == lowered) {
        return Ok(symbols.iter().map(|s| s.to_string()).collect());
    }

    let mut symbols: Vec<String> = Vec::new();
    for raw in input.split(',') {
        let symbol = raw.trim().to_uppercase();
        if symbol.is_empty() {
            continue;
        }
        if !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(format!("❌ Invalid symbol: '{}'", raw.trim()));
        }
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }

    if symbols.is_empty() {
        return Err("❌ No symbols given. Example: `AAPL,MSFT` or a preset (tech, faang)".to_string());
    }
    Ok(symbols)
}

/// Fetch history for every symbol concurrently and wait for all of them.
/// A failed fetch is logged and becomes an empty series, so one bad symbol
/// never takes down the others. Output keeps the order of `symbols`.
pub async fn load_series<A: MarketData>(api: &A, symbols: &[String]) -> Vec<SeriesRequest> {
    let fetches = symbols.iter().map(|symbol| async move {
        match api.fetch_historical_data(symbol).await {
            Ok(points) => {
                debug!("Loaded {} points for {}", points.len(), symbol);
                SeriesRequest::new(symbol.clone(), points)
            }
            Err(e) => {
                warn!("Error loading historical data for {}: {}", symbol, e);
                SeriesRequest::empty(symbol.clone())
            }
        }
    });

    join_all(fetches).await
}

/// Merge per-symbol histories into one table keyed by date.
///
/// Points before the timeframe cutoff are dropped. With `use_percentage`
/// each series is rebased to the percent change from its first retained
/// close. Rows are returned in ascending date order; a symbol with no data
/// on a date has no value in that row.
pub fn aggregate_series(
    series_list: &[SeriesRequest],
    timeframe: Timeframe,
    use_percentage: bool,
    today: NaiveDate,
) -> Vec<AggregatedRow> {
    let cutoff = timeframe.cutoff(today);
    let mut combined: BTreeMap<NaiveDate, AggregatedRow> = BTreeMap::new();

    for series in series_list {
        let mut points: Vec<_> = series
            .points
            .iter()
            .filter(|point| cutoff.map_or(true, |cutoff| point.date >= cutoff))
            .collect();
        points.sort_by_key(|point| point.date);

        let base_value = match points.first() {
            Some(first) if use_percentage => first.close,
            _ => 1.0,
        };

        for point in points {
            let value = if use_percentage {
                ((point.close / base_value) - 1.0) * 100.0
            } else {
                point.close
            };
            // A zero base close has no meaningful percent change
            if !value.is_finite() {
                continue;
            }

            combined
                .entry(point.date)
                .or_insert_with(|| AggregatedRow::new(point.date))
                .values
                .insert(series.symbol.clone(), value);
        }
    }

    combined.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::{HistoricalPoint, StockQuote, WatchlistStock};
    use std::collections::HashMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn point(y: i32, m: u32, d: u32, close: f64) -> HistoricalPoint {
        HistoricalPoint { date: date(y, m, d), close }
    }

    fn example_input() -> Vec<SeriesRequest> {
        vec![
            SeriesRequest::new("AAPL", vec![point(2025, 1, 1, 100.0), point(2025, 1, 2, 110.0)]),
            SeriesRequest::new("MSFT", vec![point(2025, 1, 1, 50.0)]),
        ]
    }

    #[test]
    fn merges_symbols_by_date() {
        let rows = aggregate_series(&example_input(), Timeframe::All, false, date(2025, 1, 10));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date(2025, 1, 1));
        assert_eq!(rows[0].value("AAPL"), Some(100.0));
        assert_eq!(rows[0].value("MSFT"), Some(50.0));
        assert_eq!(rows[1].date, date(2025, 1, 2));
        assert_eq!(rows[1].value("AAPL"), Some(110.0));
        assert_eq!(rows[1].value("MSFT"), None);
    }

    #[test]
    fn percentage_mode_rebases_to_first_close() {
        let rows = aggregate_series(&example_input(), Timeframe::All, true, date(2025, 1, 10));

        assert!(rows[0].value("AAPL").unwrap().abs() < 1e-9);
        assert!(rows[0].value("MSFT").unwrap().abs() < 1e-9);
        assert!((rows[1].value("AAPL").unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(rows[1].value("MSFT"), None);
    }

    #[test]
    fn percentage_base_is_first_point_inside_window() {
        let series = vec![SeriesRequest::new(
            "AAPL",
            vec![
                point(2025, 3, 1, 50.0),
                point(2025, 3, 28, 200.0),
                point(2025, 3, 30, 220.0),
            ],
        )];
        let rows = aggregate_series(&series, Timeframe::OneWeek, true, date(2025, 3, 31));

        assert_eq!(rows.len(), 2);
        assert!(rows[0].value("AAPL").unwrap().abs() < 1e-9);
        assert!((rows[1].value("AAPL").unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn drops_points_before_cutoff() {
        let today = date(2025, 3, 31);
        let series = vec![SeriesRequest::new(
            "AAPL",
            vec![
                point(2025, 3, 23, 1.0),
                point(2025, 3, 24, 2.0),
                point(2025, 3, 31, 3.0),
            ],
        )];

        for timeframe in [
            Timeframe::OneWeek,
            Timeframe::OneMonth,
            Timeframe::ThreeMonths,
            Timeframe::SixMonths,
            Timeframe::OneYear,
        ] {
            let cutoff = timeframe.cutoff(today).unwrap();
            let rows = aggregate_series(&series, timeframe, false, today);
            assert!(rows.iter().all(|row| row.date >= cutoff));
        }

        let week = aggregate_series(&series, Timeframe::OneWeek, false, today);
        assert_eq!(week.len(), 2);
        assert_eq!(week[0].date, date(2025, 3, 24));
    }

    #[test]
    fn empty_series_contributes_nothing() {
        let mut input = example_input();
        input.push(SeriesRequest::empty("GOOGL"));
        let rows = aggregate_series(&input, Timeframe::All, true, date(2025, 1, 10));

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.value("GOOGL").is_none()));
        assert!(aggregate_series(&[], Timeframe::All, false, date(2025, 1, 10)).is_empty());
    }

    #[test]
    fn series_filtered_to_nothing_contributes_nothing() {
        let series = vec![
            SeriesRequest::new("OLD", vec![point(2020, 1, 1, 10.0)]),
            SeriesRequest::new("NEW", vec![point(2025, 3, 30, 10.0)]),
        ];
        let rows = aggregate_series(&series, Timeframe::OneMonth, true, date(2025, 3, 31));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value("OLD"), None);
    }

    #[test]
    fn rows_are_sorted_even_when_later_symbol_starts_earlier() {
        let series = vec![
            SeriesRequest::new("LATE", vec![point(2025, 2, 3, 1.0), point(2025, 2, 1, 1.0)]),
            SeriesRequest::new("EARLY", vec![point(2025, 1, 15, 1.0), point(2025, 2, 2, 1.0)]),
        ];
        let rows = aggregate_series(&series, Timeframe::All, false, date(2025, 3, 1));
        let dates: Vec<NaiveDate> = rows.iter().map(|row| row.date).collect();

        assert_eq!(
            dates,
            vec![date(2025, 1, 15), date(2025, 2, 1), date(2025, 2, 2), date(2025, 2, 3)]
        );
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let today = date(2025, 1, 10);
        let first = aggregate_series(&example_input(), Timeframe::OneMonth, true, today);
        let second = aggregate_series(&example_input(), Timeframe::OneMonth, true, today);
        assert_eq!(first, second);
    }

    #[test]
    fn zero_base_close_is_skipped_in_percentage_mode() {
        let series = vec![SeriesRequest::new(
            "ZERO",
            vec![point(2025, 1, 1, 0.0), point(2025, 1, 2, 5.0)],
        )];
        let rows = aggregate_series(&series, Timeframe::All, true, date(2025, 1, 10));
        // 0/0 and 5/0 are both non-finite
        assert!(rows.is_empty());
    }

    #[test]
    fn parses_symbol_lists_and_presets() {
        assert_eq!(parse_symbols("aapl, msft,AAPL").unwrap(), vec!["AAPL", "MSFT"]);
        assert_eq!(parse_symbols("FAANG").unwrap().len(), 5);
        assert_eq!(parse_symbols("tech").unwrap(), vec!["AAPL", "MSFT", "GOOGL"]);
        assert_eq!(parse_symbols("BRK.B").unwrap(), vec!["BRK.B"]);
        assert!(parse_symbols(" , ").is_err());
        assert!(parse_symbols("AAPL/../x").is_err());
    }

    struct StubApi {
        histories: HashMap<String, Vec<HistoricalPoint>>,
    }

    impl MarketData for StubApi {
        async fn fetch_stock_quote(&self, _symbol: &str) -> Result<Vec<StockQuote>, ApiError> {
            Ok(Vec::new())
        }

        async fn fetch_historical_data(&self, symbol: &str) -> Result<Vec<HistoricalPoint>, ApiError> {
            self.histories
                .get(symbol)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(symbol.to_string()))
        }

        async fn fetch_watchlist(&self) -> Result<Vec<WatchlistStock>, ApiError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn failed_fetch_becomes_empty_series() {
        let api = StubApi {
            histories: HashMap::from([("AAPL".to_string(), vec![point(2025, 1, 1, 100.0)])]),
        };
        let symbols = vec!["AAPL".to_string(), "FAIL".to_string()];

        let series = load_series(&api, &symbols).await;
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].symbol, "AAPL");
        assert_eq!(series[0].points.len(), 1);
        assert_eq!(series[1], SeriesRequest::empty("FAIL"));

        let rows = aggregate_series(&series, Timeframe::All, false, date(2025, 1, 10));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value("FAIL"), None);
    }
}
