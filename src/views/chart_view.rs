use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use serenity::builder::{CreateAttachment, CreateEmbed, CreateEmbedFooter};
use tracing::debug;

use crate::api::MarketData;
use crate::models::{AggregatedRow, ChartKind, ChartParams, Timeframe};
use crate::services::chart_service::{self, ChartError, ChartSpec};
use crate::services::series_service::{aggregate_series, load_series, parse_symbols};
use crate::utils::Fenced;

/// File name the chart image is attached under
pub const CHART_ATTACHMENT: &str = "chart.png";

/// Parameters and table produced by one refresh
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSnapshot {
    pub params: ChartParams,
    pub rows: Vec<AggregatedRow>,
}

/// State of a price chart: current selection plus the latest fenced table
pub struct ChartView<A> {
    api: Arc<A>,
    params: Mutex<ChartParams>,
    state: Fenced<ChartSnapshot>,
}

impl<A: MarketData> ChartView<A> {
    pub fn new(api: Arc<A>, params: ChartParams) -> Self {
        Self {
            api,
            params: Mutex::new(params),
            state: Fenced::new(),
        }
    }

    fn lock_params(&self) -> MutexGuard<'_, ChartParams> {
        match self.params.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn params(&self) -> ChartParams {
        self.lock_params().clone()
    }

    /// Change one selector, e.g. `timeframe 3m`; returns the new parameters
    pub fn apply_setting(&self, field: &str, value: &str) -> Result<ChartParams, String> {
        let mut params = self.lock_params();
        apply_setting(&mut params, field, value)?;
        Ok(params.clone())
    }

    /// Fetch every selected symbol, aggregate, and publish the table.
    /// Returns `None` when a newer refresh started while this one was
    /// in flight; its result is discarded.
    pub async fn refresh(&self, today: NaiveDate) -> Option<ChartSnapshot> {
        let ticket = self.state.begin();
        let params = self.params();

        let series = load_series(self.api.as_ref(), &params.symbols).await;
        let rows = aggregate_series(&series, params.timeframe, params.use_percentage, today);
        let snapshot = ChartSnapshot { params, rows };

        if self.state.publish(ticket, snapshot.clone()) {
            Some(snapshot)
        } else {
            debug!(
                "Discarding stale chart refresh for {}",
                snapshot.params.symbols.join(",")
            );
            None
        }
    }

    pub fn latest(&self) -> Option<ChartSnapshot> {
        self.state.latest()
    }
}

/// Parse `<symbols|preset> [timeframe] [line|area|bar] [pct]`.
/// Options after the symbols may come in any order.
pub fn parse_chart_args(args: &[&str]) -> Result<ChartParams, String> {
    let (first, rest) = args
        .split_first()
        .ok_or_else(|| "❌ Usage: `$chart <SYMBOLS|preset> [timeframe] [line|area|bar] [pct]`".to_string())?;

    let mut params = ChartParams {
        symbols: parse_symbols(first)?,
        timeframe: Timeframe::default(),
        kind: ChartKind::default(),
        use_percentage: false,
    };

    for arg in rest {
        let lowered = arg.to_lowercase();
        if matches!(lowered.as_str(), "pct" | "%" | "percent") {
            params.use_percentage = true;
        } else if let Ok(kind) = ChartKind::parse(&lowered) {
            params.kind = kind;
        } else {
            params.timeframe = Timeframe::parse(&lowered)?;
        }
    }
    Ok(params)
}

/// Apply `$live set <field> <value>` to chart parameters
pub fn apply_setting(params: &mut ChartParams, field: &str, value: &str) -> Result<(), String> {
    match field.to_lowercase().as_str() {
        "timeframe" | "tf" => params.timeframe = Timeframe::parse(value)?,
        "type" | "kind" => params.kind = ChartKind::parse(value)?,
        "pct" | "percentage" => {
            params.use_percentage = match value.to_lowercase().as_str() {
                "on" | "true" | "yes" | "1" => true,
                "off" | "false" | "no" | "0" => false,
                _ => return Err(format!("❌ Invalid value '{}' for pct. Use on or off", value)),
            }
        }
        "symbols" => params.symbols = parse_symbols(value)?,
        _ => {
            return Err(format!(
                "❌ Unknown setting '{}'. Supported: timeframe, type, pct, symbols",
                field
            ))
        }
    }
    Ok(())
}

pub fn render_snapshot(snapshot: &ChartSnapshot, width: u32, height: u32) -> Result<Vec<u8>, ChartError> {
    let spec = ChartSpec::from_params(&snapshot.params, width, height);
    chart_service::render_chart(&snapshot.rows, &spec)
}

/// Embed describing a chart, pointing at the attached image when there is one
pub fn chart_embed(params: &ChartParams, has_image: bool) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title(format!("📈 {}", params.symbols.join(", ")))
        .field("Timeframe", params.timeframe.label(), true)
        .field("Type", params.kind.label(), true)
        .field("Mode", if params.use_percentage { "% change" } else { "Price" }, true)
        .color(0x8884d8);

    if has_image {
        embed = embed.image(format!("attachment://{}", CHART_ATTACHMENT));
    } else {
        embed = embed.description("No chart data available");
    }
    embed.footer(CreateEmbedFooter::new(format!(
        "Change with: $chart {} {}",
        params.symbols.join(","),
        params.timeframe.code()
    )))
}

/// Embed plus image for a snapshot; rendering failures fall back to text
pub fn chart_message_parts(
    snapshot: &ChartSnapshot,
    width: u32,
    height: u32,
) -> (CreateEmbed, Option<CreateAttachment>) {
    match render_snapshot(snapshot, width, height) {
        Ok(image) => (
            chart_embed(&snapshot.params, true),
            Some(CreateAttachment::bytes(image, CHART_ATTACHMENT)),
        ),
        Err(ChartError::NoData) => (chart_embed(&snapshot.params, false), None),
        Err(e) => {
            tracing::error!("Chart generation error: {}", e);
            (chart_embed(&snapshot.params, false), None)
        }
    }
}
