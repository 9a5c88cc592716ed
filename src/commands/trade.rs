use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::services::quote_service::{format_price, load_quote};
use crate::services::series_service::parse_symbols;
use crate::services::trade_service::{self, TradeSide};

/// `$buy|$sell <SYMBOL> [shares]`. Only confirms; no order is placed.
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str], side: TradeSide) -> Result<(), String> {
    let usage = format!("❌ Usage: `${} <SYMBOL> [shares]`", side.label().to_lowercase());
    let symbol = match args.first().map(|arg| parse_symbols(arg)) {
        Some(Ok(symbols)) if symbols.len() == 1 => symbols[0].clone(),
        _ => return Err(usage),
    };
    let shares = trade_service::parse_shares(args.get(1).copied());

    let state = super::app_state(ctx).await?;
    let price = load_quote(state.api.as_ref(), &symbol)
        .await
        .and_then(|quote| quote.last_price())
        .ok_or_else(|| format!("❌ Stock data not available for {}", symbol))?;

    let confirmation = trade_service::confirm(side, &symbol, shares, price);
    tracing::info!("{} placeholder for user {}: {}", side.label(), msg.author.id, confirmation.message());

    let color = match side {
        TradeSide::Buy => 0x00c49f,
        TradeSide::Sell => 0xff8042,
    };
    let embed = CreateEmbed::default()
        .title(format!("🧾 {} Order", side.label()))
        .description(confirmation.message())
        .field("Shares", confirmation.shares.to_string(), true)
        .field("Price", format_price(Some(confirmation.price)), true)
        .field("Total", format_price(Some(confirmation.total)), true)
        .footer(CreateEmbedFooter::new("Trading is not enabled; no order was placed."))
        .color(color);

    super::reply(ctx, msg, vec![embed], None).await
}
