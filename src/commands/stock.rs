use chrono::Utc;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::models::{ChartParams, Timeframe};
use crate::services::series_service::parse_symbols;
use crate::views::chart_view::chart_message_parts;
use crate::views::quote_view::detail_embed;
use crate::views::{ChartView, DetailSnapshot, DetailView};

/// `$stock <SYMBOL> [timeframe]`: quote details and the symbol's chart
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let symbol = match args.first() {
        Some(arg) => match parse_symbols(arg)?.as_slice() {
            [symbol] => symbol.clone(),
            _ => return Err("❌ Give a single symbol, e.g. `$stock AAPL`".to_string()),
        },
        None => return Err("❌ Usage: `$stock <SYMBOL> [timeframe]`".to_string()),
    };

    let mut params = ChartParams::for_symbol(&symbol);
    if let Some(timeframe) = args.get(1) {
        params.timeframe = Timeframe::parse(timeframe)?;
    }

    let state = super::app_state(ctx).await?;
    super::broadcast_typing(ctx, msg).await;

    let detail = DetailView::new(state.api.clone(), &symbol);
    let chart = ChartView::new(state.api.clone(), params);
    let (snapshot, chart_snapshot) = tokio::join!(detail.refresh(), chart.refresh(Utc::now().date_naive()));

    let snapshot = snapshot.unwrap_or(DetailSnapshot { symbol, quote: None });
    let mut embeds = vec![detail_embed(&snapshot)];
    let mut image = None;

    // Without a quote the page only shows the placeholder
    if snapshot.quote.is_some() {
        if let Some(chart_snapshot) = chart_snapshot {
            let (embed, chart_image) =
                chart_message_parts(&chart_snapshot, state.config.chart_width, state.config.chart_height);
            embeds.push(embed);
            image = chart_image;
        }
    }

    super::reply(ctx, msg, embeds, image).await
}
