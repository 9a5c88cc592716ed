use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::views::quote_view::watchlist_embed;
use crate::views::WatchlistView;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let state = super::app_state(ctx).await?;
    super::broadcast_typing(ctx, msg).await;

    let rows = WatchlistView::new(state.api.clone())
        .refresh()
        .await
        .unwrap_or_default();
    tracing::debug!("Watchlist loaded with {} rows", rows.len());

    super::reply(ctx, msg, vec![watchlist_embed(&rows)], None).await
}
