use chrono::Utc;
use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::models::ChartParams;
use crate::services::market_service::{self, format_indices, format_movers};
use crate::views::chart_view::chart_message_parts;
use crate::views::quote_view::watchlist_embed;
use crate::views::{ChartView, WatchlistView};

/// Symbol charted on the dashboard
const DASHBOARD_SYMBOL: &str = "AAPL";

pub fn market_embed() -> CreateEmbed {
    let overview = market_service::mock_overview();
    CreateEmbed::default()
        .title("🌐 Market Overview")
        .field("Indices", format_indices(&overview), false)
        .field("Top Gainers", format_movers(&overview.top_gainers), true)
        .field("Top Losers", format_movers(&overview.top_losers), true)
        .color(0xffc658)
}

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let state = super::app_state(ctx).await?;
    super::broadcast_typing(ctx, msg).await;

    let chart = ChartView::new(state.api.clone(), ChartParams::for_symbol(DASHBOARD_SYMBOL));
    let watchlist = WatchlistView::new(state.api.clone());
    let (chart_snapshot, rows) = tokio::join!(chart.refresh(Utc::now().date_naive()), watchlist.refresh());

    let mut embeds = Vec::new();
    let mut image = None;
    if let Some(snapshot) = chart_snapshot {
        let (embed, chart_image) =
            chart_message_parts(&snapshot, state.config.chart_width, state.config.chart_height);
        embeds.push(embed);
        image = chart_image;
    }
    embeds.push(watchlist_embed(&rows.unwrap_or_default()));
    embeds.push(market_embed());

    super::reply(ctx, msg, embeds, image).await
}
