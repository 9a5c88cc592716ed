use chrono::Utc;
use serenity::builder::{CreateAttachment, CreateEmbed};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::models::{ChartKind, Holding, PortfolioSummary, Timeframe};
use crate::services::chart_service::{self, ChartError, ChartSpec};
use crate::services::market_service::format_percent;
use crate::services::portfolio_service::{self, format_money_change, format_signed_money, PERFORMANCE_SERIES};
use crate::services::quote_service::format_price;
use crate::services::series_service::aggregate_series;
use crate::utils::Table;
use crate::views::chart_view::CHART_ATTACHMENT;

pub fn holdings_table(holdings: &[Holding]) -> String {
    let mut table = Table::new(&["Symbol", "Shares", "Avg Price", "Current", "Value", "Gain/Loss", "%"]);
    for holding in holdings {
        table.add_row(vec![
            holding.symbol.clone(),
            holding.shares.to_string(),
            format_price(Some(holding.avg_price)),
            format_price(Some(holding.current_price)),
            format_price(Some(holding.value)),
            format_signed_money(holding.gain_loss()),
            format_percent(holding.gain_loss_percent()),
        ]);
    }
    table.render()
}

pub fn allocation_text(summary: &PortfolioSummary) -> String {
    summary
        .allocation
        .iter()
        .map(|a| format!("{}: {:.1}% ({} shares)", a.symbol, a.percent, a.shares))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let state = super::app_state(ctx).await?;

    let holdings = portfolio_service::mock_holdings();
    let summary = portfolio_service::mock_summary(&holdings);

    let embed = CreateEmbed::default()
        .title("💼 Portfolio")
        .field("Total Value", format_price(Some(summary.total_value)), true)
        .field(
            "Day Change",
            format_money_change(summary.day_change, summary.day_change_percent),
            true,
        )
        .field(
            "Total Gain/Loss",
            format_money_change(summary.total_gain_loss, summary.total_gain_loss_percent),
            true,
        )
        .field("Positions", summary.positions.to_string(), true)
        .field("Allocation", allocation_text(&summary), false)
        .field("Holdings", holdings_table(&holdings), false)
        .color(0x0088fe);

    // Performance history is plotted like any other series
    let series = [portfolio_service::performance_series(&portfolio_service::mock_performance())];
    let rows = aggregate_series(&series, Timeframe::All, false, Utc::now().date_naive());
    let symbols = [PERFORMANCE_SERIES.to_string()];
    let spec = ChartSpec {
        title: "Portfolio Performance".to_string(),
        symbols: &symbols,
        kind: ChartKind::Line,
        use_percentage: false,
        width: state.config.chart_width,
        height: state.config.chart_height,
    };

    let (embed, image) = match chart_service::render_chart(&rows, &spec) {
        Ok(data) => (
            embed.image(format!("attachment://{}", CHART_ATTACHMENT)),
            Some(CreateAttachment::bytes(data, CHART_ATTACHMENT)),
        ),
        Err(ChartError::NoData) => (embed, None),
        Err(e) => {
            tracing::error!("Portfolio chart generation error: {}", e);
            (embed, None)
        }
    };

    super::reply(ctx, msg, vec![embed], image).await
}
