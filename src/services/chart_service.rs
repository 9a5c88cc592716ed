use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use plotters::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::models::{AggregatedRow, ChartKind, ChartParams};

/// One colour per symbol, cycling after ten
const PALETTE: [RGBColor; 10] = [
    RGBColor(0x88, 0x84, 0xd8),
    RGBColor(0x82, 0xca, 0x9d),
    RGBColor(0xff, 0xc6, 0x58),
    RGBColor(0xff, 0x80, 0x42),
    RGBColor(0x00, 0x88, 0xfe),
    RGBColor(0x00, 0xc4, 0x9f),
    RGBColor(0xff, 0xbb, 0x28),
    RGBColor(0xff, 0x80, 0x42),
    RGBColor(0xa4, 0xde, 0x6c),
    RGBColor(0xd0, 0xed, 0x57),
];

static CHART_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("No chart data available")]
    NoData,
    #[error("Failed to render chart: {0}")]
    Render(String),
    #[error("Failed to read chart file: {0}")]
    Io(#[from] std::io::Error),
}

fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

/// What to draw and how
#[derive(Debug, Clone)]
pub struct ChartSpec<'a> {
    pub title: String,
    pub symbols: &'a [String],
    pub kind: ChartKind,
    pub use_percentage: bool,
    pub width: u32,
    pub height: u32,
}

impl<'a> ChartSpec<'a> {
    pub fn from_params(params: &'a ChartParams, width: u32, height: u32) -> Self {
        Self {
            title: chart_title(params),
            symbols: &params.symbols,
            kind: params.kind,
            use_percentage: params.use_percentage,
            width,
            height,
        }
    }
}

pub fn chart_title(params: &ChartParams) -> String {
    let mode = if params.use_percentage { " (%)" } else { "" };
    format!(
        "{} Price History{} - {}",
        params.symbols.join(", "),
        mode,
        params.timeframe.label()
    )
}

pub fn series_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Axis / tooltip text: `$12.34` for prices, `12.34%` in percentage mode
pub fn format_axis_value(value: f64, use_percentage: bool) -> String {
    if use_percentage {
        format!("{:.2}%", value)
    } else {
        format!("${:.2}", value)
    }
}

/// Padded y range over every value of `symbols`, `None` when there is none
pub fn value_range(rows: &[AggregatedRow], symbols: &[String], use_percentage: bool) -> Option<(f64, f64)> {
    let (min, max) = rows
        .iter()
        .flat_map(|row| symbols.iter().filter_map(move |symbol| row.value(symbol)))
        .fold(None, |acc: Option<(f64, f64)>, value| match acc {
            None => Some((value, value)),
            Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
        })?;

    let spread = max - min;
    let padding = if spread < 1e-8 {
        (max.abs() * 0.05).max(1.0)
    } else {
        spread * 0.1
    };

    let mut y_min = min - padding;
    if !use_percentage {
        // Prices never go negative
        y_min = y_min.max(0.0);
    }
    Some((y_min, max + padding))
}

/// Render aggregated rows as a PNG image
pub fn render_chart(rows: &[AggregatedRow], spec: &ChartSpec<'_>) -> Result<Vec<u8>, ChartError> {
    if rows.is_empty() {
        return Err(ChartError::NoData);
    }
    let (y_min, y_max) =
        value_range(rows, spec.symbols, spec.use_percentage).ok_or(ChartError::NoData)?;

    // BitMapBackend encodes PNG only when writing to a file
    let temp_file = std::env::temp_dir().join(format!(
        "stock_dashboard_chart_{}_{}.png",
        chrono::Utc::now().timestamp_millis(),
        CHART_SEQUENCE.fetch_add(1, Ordering::Relaxed)
    ));

    let image = draw_chart(&temp_file, rows, spec, y_min, y_max)
        .and_then(|_| fs::read(&temp_file).map_err(ChartError::from));

    let _ = fs::remove_file(&temp_file);

    if let Ok(data) = &image {
        debug!("Rendered '{}' ({} rows, {} bytes)", spec.title, rows.len(), data.len());
    }
    image
}

fn draw_chart(
    path: &Path,
    rows: &[AggregatedRow],
    spec: &ChartSpec<'_>,
    y_min: f64,
    y_max: f64,
) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, (spec.width, spec.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    // Rows are placed at integer x positions so bars get a slot per date
    let x_max = rows.len() as f64 - 0.5;
    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 32.0).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..x_max, y_min..y_max)
        .map_err(render_err)?;

    let x_label = |x: &f64| {
        let index = x.round();
        if index < 0.0 || (x - index).abs() > 1e-6 {
            return String::new();
        }
        rows.get(index as usize)
            .map(|row| row.date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };
    let y_label = |y: &f64| format_axis_value(*y, spec.use_percentage);

    chart
        .configure_mesh()
        .x_labels(rows.len().min(8))
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .x_desc("Date")
        .y_desc(if spec.use_percentage { "Change (%)" } else { "Price (USD)" })
        .draw()
        .map_err(render_err)?;

    let baseline = if y_min > 0.0 {
        y_min
    } else if y_max < 0.0 {
        y_max
    } else {
        0.0
    };
    let bar_width = 0.8 / spec.symbols.len().max(1) as f64;

    for (index, symbol) in spec.symbols.iter().enumerate() {
        let color = series_color(index);
        // Dates without a value are skipped, never drawn as zero
        let points: Vec<(f64, f64)> = rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.value(symbol).map(|value| (i as f64, value)))
            .collect();
        if points.is_empty() {
            continue;
        }

        let series = match spec.kind {
            ChartKind::Line => chart.draw_series(LineSeries::new(points, &color).point_size(3)),
            ChartKind::Area => chart.draw_series(
                AreaSeries::new(points, baseline, &color.mix(0.3)).border_style(&color),
            ),
            ChartKind::Bar => chart.draw_series(points.into_iter().map(|(x, value)| {
                let left = x - 0.4 + index as f64 * bar_width;
                Rectangle::new([(left, baseline), (left + bar_width, value)], color.filled())
            })),
        }
        .map_err(render_err)?;

        series
            .label(symbol.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timeframe;
    use chrono::NaiveDate;

    fn row(day: u32, values: &[(&str, f64)]) -> AggregatedRow {
        let mut row = AggregatedRow::new(NaiveDate::from_ymd_opt(2025, 1, day).unwrap());
        for (symbol, value) in values {
            row.values.insert(symbol.to_string(), *value);
        }
        row
    }

    #[test]
    fn value_range_pads_and_clamps_prices() {
        let rows = vec![row(1, &[("AAPL", 100.0), ("MSFT", 50.0)]), row(2, &[("AAPL", 110.0)])];
        let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];

        let (lo, hi) = value_range(&rows, &symbols, false).unwrap();
        assert!((lo - 44.0).abs() < 1e-9);
        assert!((hi - 116.0).abs() < 1e-9);

        let pct_rows = vec![row(1, &[("AAPL", -5.0)]), row(2, &[("AAPL", 5.0)])];
        let (lo, hi) = value_range(&pct_rows, &symbols[..1], true).unwrap();
        assert!((lo + 6.0).abs() < 1e-9);
        assert!((hi - 6.0).abs() < 1e-9);
    }

    #[test]
    fn value_range_ignores_unselected_symbols() {
        let rows = vec![row(1, &[("AAPL", 100.0)])];
        assert_eq!(value_range(&rows, &["MSFT".to_string()], false), None);

        let (lo, hi) = value_range(&rows, &["AAPL".to_string()], false).unwrap();
        assert!(lo < 100.0 && hi > 100.0);
    }

    #[test]
    fn empty_rows_are_no_data() {
        let params = ChartParams::for_symbol("AAPL");
        let spec = ChartSpec::from_params(&params, 640, 480);
        assert!(matches!(render_chart(&[], &spec), Err(ChartError::NoData)));

        let other = vec![row(1, &[("MSFT", 1.0)])];
        assert!(matches!(render_chart(&other, &spec), Err(ChartError::NoData)));
    }

    #[test]
    fn renders_png_for_each_kind() {
        // MSFT has no value on the third date
        let rows = vec![
            row(1, &[("AAPL", 100.0), ("MSFT", 50.0)]),
            row(2, &[("AAPL", 102.5), ("MSFT", 51.0)]),
            row(3, &[("AAPL", 101.0)]),
            row(6, &[("AAPL", 104.0), ("MSFT", 49.5)]),
        ];
        let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];

        for kind in [ChartKind::Line, ChartKind::Area, ChartKind::Bar] {
            let spec = ChartSpec {
                title: format!("{:?} test", kind),
                symbols: &symbols,
                kind,
                use_percentage: false,
                width: 320,
                height: 200,
            };
            let image = render_chart(&rows, &spec).unwrap();
            assert_eq!(&image[..4], &[137, 80, 78, 71], "{:?} is not a PNG", kind);
        }
    }

    #[test]
    fn titles_and_labels() {
        let mut params = ChartParams::for_symbol("aapl");
        params.symbols.push("MSFT".to_string());
        params.timeframe = Timeframe::ThreeMonths;
        params.use_percentage = true;
        assert_eq!(chart_title(&params), "AAPL, MSFT Price History (%) - 3 Months");

        assert_eq!(format_axis_value(12.345, false), "$12.35");
        assert_eq!(format_axis_value(-1.5, true), "-1.50%");
        let (first, wrapped) = (series_color(0), series_color(10));
        assert_eq!((first.0, first.1, first.2), (wrapped.0, wrapped.1, wrapped.2));
    }
}
