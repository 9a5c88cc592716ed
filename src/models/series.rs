//! Historical series and chart models

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// A single daily close, as returned by the history endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    #[serde(deserialize_with = "de_iso_date")]
    pub date: NaiveDate,
    pub close: f64,
}

/// Tiingo sends `2025-01-02T00:00:00.000Z`; only the calendar date is kept.
pub fn de_iso_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: String = Deserialize::deserialize(deserializer)?;
    let date_part = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

/// History for one symbol. An empty `points` list means the fetch failed
/// or returned nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRequest {
    pub symbol: String,
    pub points: Vec<HistoricalPoint>,
}

impl SeriesRequest {
    pub fn new(symbol: impl Into<String>, points: Vec<HistoricalPoint>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }
}

/// One date of the merged chart table. A symbol without data on this date
/// has no entry in `values`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl AggregatedRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    pub fn value(&self, symbol: &str) -> Option<f64> {
        self.values.get(symbol).copied()
    }
}

/// Lookback window applied to historical data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    OneWeek,
    #[default]
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    All,
}

impl Timeframe {
    /// Parse timeframe string
    /// Supported: 1w, 1m, 3m, 6m, 1y, all
    pub fn parse(timeframe: &str) -> Result<Self, String> {
        match timeframe.to_lowercase().as_str() {
            "1w" | "1week" => Ok(Timeframe::OneWeek),
            "1m" | "1month" => Ok(Timeframe::OneMonth),
            "3m" | "3months" => Ok(Timeframe::ThreeMonths),
            "6m" | "6months" => Ok(Timeframe::SixMonths),
            "1y" | "1year" => Ok(Timeframe::OneYear),
            "all" => Ok(Timeframe::All),
            _ => Err(format!(
                "❌ Unknown timeframe: '{}'. Supported: 1w, 1m, 3m, 6m, 1y, all",
                timeframe
            )),
        }
    }

    /// Number of days to look back, `None` for no limit
    pub fn days(self) -> Option<i64> {
        match self {
            Timeframe::OneWeek => Some(7),
            Timeframe::OneMonth => Some(30),
            Timeframe::ThreeMonths => Some(90),
            Timeframe::SixMonths => Some(180),
            Timeframe::OneYear => Some(365),
            Timeframe::All => None,
        }
    }

    /// Earliest date kept for a given reference day
    pub fn cutoff(self, today: NaiveDate) -> Option<NaiveDate> {
        self.days().map(|days| today - Duration::days(days))
    }

    pub fn code(self) -> &'static str {
        match self {
            Timeframe::OneWeek => "1w",
            Timeframe::OneMonth => "1m",
            Timeframe::ThreeMonths => "3m",
            Timeframe::SixMonths => "6m",
            Timeframe::OneYear => "1y",
            Timeframe::All => "all",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::OneWeek => "1 Week",
            Timeframe::OneMonth => "1 Month",
            Timeframe::ThreeMonths => "3 Months",
            Timeframe::SixMonths => "6 Months",
            Timeframe::OneYear => "1 Year",
            Timeframe::All => "All Time",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Line,
    Area,
    Bar,
}

impl ChartKind {
    pub fn parse(kind: &str) -> Result<Self, String> {
        match kind.to_lowercase().as_str() {
            "line" => Ok(ChartKind::Line),
            "area" => Ok(ChartKind::Area),
            "bar" => Ok(ChartKind::Bar),
            _ => Err(format!(
                "❌ Unknown chart type: '{}'. Supported: line, area, bar",
                kind
            )),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Line => "Line",
            ChartKind::Area => "Area",
            ChartKind::Bar => "Bar",
        }
    }
}

/// Everything a chart view needs to know to build its table
#[derive(Debug, Clone, PartialEq)]
pub struct ChartParams {
    pub symbols: Vec<String>,
    pub timeframe: Timeframe,
    pub kind: ChartKind,
    pub use_percentage: bool,
}

impl ChartParams {
    pub fn for_symbol(symbol: &str) -> Self {
        Self {
            symbols: vec![symbol.to_uppercase()],
            timeframe: Timeframe::default(),
            kind: ChartKind::default(),
            use_percentage: false,
        }
    }
}
