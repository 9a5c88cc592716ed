use chrono::Utc;
use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::views::chart_view::{chart_message_parts, parse_chart_args};
use crate::views::ChartView;

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    tracing::info!("📈 Chart command called with args: {:?}", args);

    if args.is_empty() {
        let help_embed = CreateEmbed::default()
            .title("📈 Chart Command")
            .description("Plot daily closing prices for one or more symbols")
            .field("Usage", "`$chart <SYMBOLS|preset> [timeframe] [line|area|bar] [pct]`", false)
            .field(
                "Examples",
                "`$chart AAPL` (1 month line chart)\n\
                 `$chart AAPL,MSFT 1y area`\n\
                 `$chart faang 6m pct` (% change from the first day)",
                false,
            )
            .field("Timeframes", "1w, 1m, 3m, 6m, 1y, all", false)
            .field("Presets", "`tech` = AAPL, MSFT, GOOGL\n`faang` = AAPL, MSFT, GOOGL, AMZN, META", false)
            .color(0x8884d8);
        return super::reply(ctx, msg, vec![help_embed], None).await;
    }

    let params = parse_chart_args(args)?;
    let state = super::app_state(ctx).await?;
    super::broadcast_typing(ctx, msg).await;

    let view = ChartView::new(state.api.clone(), params);
    let snapshot = view
        .refresh(Utc::now().date_naive())
        .await
        .ok_or_else(|| "❌ Chart refresh was superseded".to_string())?;
    tracing::info!(
        "Chart for {} has {} rows",
        snapshot.params.symbols.join(","),
        snapshot.rows.len()
    );

    let (embed, image) =
        chart_message_parts(&snapshot, state.config.chart_width, state.config.chart_height);
    super::reply(ctx, msg, vec![embed], image).await
}
