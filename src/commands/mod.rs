pub mod chart;
pub mod dashboard;
pub mod help;
pub mod live;
pub mod portfolio;
pub mod stock;
pub mod trade;
pub mod watchlist;

use std::sync::Arc;

use serenity::builder::{CreateAttachment, CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use tracing::{debug, error, warn};

use crate::services::trade_service::TradeSide;
use crate::utils::{check_cooldown, check_global_rate_limit, user_facing_error};
use crate::{AppState, SharedState};

/// Every command name and alias the bot answers to
const COMMANDS: &[&str] = &[
    "$help", "$dashboard", "$dash", "$chart", "$watchlist", "$wl", "$stock", "$quote", "$buy",
    "$sell", "$portfolio", "$pf", "$live",
];

pub async fn handle_message(ctx: &Context, msg: &Message) {
    if msg.author.bot {
        return;
    }

    // Parse command and arguments
    let parts: Vec<&str> = msg.content.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
        return;
    };
    let command = command.to_lowercase();
    if !COMMANDS.contains(&command.as_str()) {
        return;
    }

    if let Err(wait_ms) = check_global_rate_limit().await {
        warn!("Global rate limit hit, dropping {} ({} ms until a slot frees)", command, wait_ms);
        return;
    }

    if let Err((remaining, should_warn)) = check_cooldown(msg.author.id, &command).await {
        debug!("{} on cooldown for user {} ({}s)", command, msg.author.id, remaining);
        if should_warn {
            let _ = msg
                .channel_id
                .send_message(
                    ctx,
                    CreateMessage::default().embed(
                        CreateEmbed::default()
                            .title("Command Cooldown")
                            .description(format!(
                                "⏳ Please wait {} seconds before using this command again.",
                                remaining
                            ))
                            .color(0xffa500),
                    ),
                )
                .await;
        }
        return;
    }

    let result = match command.as_str() {
        "$help" => help::execute(ctx, msg).await,
        "$dashboard" | "$dash" => dashboard::execute(ctx, msg).await,
        "$chart" => chart::execute(ctx, msg, args).await,
        "$watchlist" | "$wl" => watchlist::execute(ctx, msg).await,
        "$stock" | "$quote" => stock::execute(ctx, msg, args).await,
        "$buy" => trade::execute(ctx, msg, args, TradeSide::Buy).await,
        "$sell" => trade::execute(ctx, msg, args, TradeSide::Sell).await,
        "$portfolio" | "$pf" => portfolio::execute(ctx, msg).await,
        "$live" => live::execute(ctx, msg, args).await,
        _ => return,
    };

    if let Err(e) = result {
        error!("❌ Error executing command {}: {}", command, e);

        let embed = CreateEmbed::default()
            .title("Command Error")
            .description(user_facing_error(&e))
            .color(0xff0000);

        let _ = msg
            .channel_id
            .send_message(ctx, CreateMessage::default().embed(embed))
            .await;
    }
}

/// Shared config and API client stored in the client data
pub async fn app_state(ctx: &Context) -> Result<Arc<AppState>, String> {
    let data = ctx.data.read().await;
    data.get::<SharedState>()
        .cloned()
        .ok_or_else(|| "Bot state not initialized".to_string())
}

/// Send embeds, with the chart image attached when there is one
pub async fn reply(
    ctx: &Context,
    msg: &Message,
    embeds: Vec<CreateEmbed>,
    image: Option<CreateAttachment>,
) -> Result<(), String> {
    let mut message = CreateMessage::default().embeds(embeds);
    if let Some(image) = image {
        message = message.add_file(image);
    }

    msg.channel_id
        .send_message(ctx, message)
        .await
        .map_err(|e| format!("Failed to send message: {}", e))?;
    Ok(())
}

/// Show the typing indicator while data is fetched; failures are harmless
pub async fn broadcast_typing(ctx: &Context, msg: &Message) {
    if let Err(e) = msg.channel_id.broadcast_typing(&ctx.http).await {
        warn!("Failed to broadcast typing: {}", e);
    }
}
