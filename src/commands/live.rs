use std::sync::Arc;

use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use tokio::sync::Mutex;

use crate::api::TiingoClient;
use crate::config::Config;
use crate::services::series_service::parse_symbols;
use crate::views::chart_view::parse_chart_args;
use crate::views::live::{self, LiveEntry};
use crate::views::{LiveKind, LiveRegistry, LiveSettings, LiveViews};

const USAGE: &str = "❌ Usage: `$live watchlist`, `$live stock <SYMBOL>`, `$live chart <SYMBOLS> [options]`, \
                     `$live set <timeframe|type|pct|symbols> <value>` or `$live stop [kind]`";

pub fn live_settings(config: &Config) -> LiveSettings {
    LiveSettings {
        quote_refresh: config.quote_refresh,
        chart_refresh: config.chart_refresh,
        lifetime: config.live_view_ttl,
        chart_width: config.chart_width,
        chart_height: config.chart_height,
    }
}

async fn registry(ctx: &Context) -> Result<Arc<Mutex<LiveViews<TiingoClient>>>, String> {
    let data = ctx.data.read().await;
    data.get::<LiveRegistry>()
        .cloned()
        .ok_or_else(|| "Live view registry not initialized".to_string())
}

async fn notice(ctx: &Context, msg: &Message, text: String) -> Result<(), String> {
    let embed = CreateEmbed::default()
        .title("🔴 Live Views")
        .description(text)
        .color(0x00b0f4);
    super::reply(ctx, msg, vec![embed], None).await
}

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(USAGE.to_string());
    };
    let subcommand = subcommand.to_lowercase();

    match subcommand.as_str() {
        "stop" => stop(ctx, msg, rest).await,
        "set" => set(ctx, msg, rest).await,
        _ => start(ctx, msg, &subcommand, rest).await,
    }
}

async fn start(ctx: &Context, msg: &Message, kind: &str, args: &[&str]) -> Result<(), String> {
    let kind = LiveKind::parse(kind).ok_or_else(|| USAGE.to_string())?;
    let state = super::app_state(ctx).await?;
    let registry = registry(ctx).await?;
    let settings = live_settings(&state.config);
    let channel_id = msg.channel_id;

    // The placeholder message is posted before the registry is locked
    let entry: LiveEntry<TiingoClient> = match kind {
        LiveKind::Watchlist => live::start_watchlist(ctx, channel_id, state.api.clone(), settings).await?,
        LiveKind::Detail => {
            let symbol = match args.first().map(|arg| parse_symbols(arg)) {
                Some(Ok(symbols)) if symbols.len() == 1 => symbols[0].clone(),
                _ => return Err("❌ Usage: `$live stock <SYMBOL>`".to_string()),
            };
            live::start_detail(ctx, channel_id, state.api.clone(), &symbol, settings).await?
        }
        LiveKind::Chart => {
            let params = parse_chart_args(args)?;
            live::start_chart(ctx, channel_id, state.api.clone(), params, settings).await?
        }
    };

    let replaced = registry.lock().await.insert(channel_id, kind, entry);
    tracing::info!(
        "Live {} started by {} in channel {} (replaced: {})",
        kind,
        msg.author.id,
        channel_id,
        replaced
    );
    Ok(())
}

async fn stop(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let kind = match args.first() {
        Some(arg) => Some(LiveKind::parse(arg).ok_or_else(|| format!("❌ Unknown live view '{}'", arg))?),
        None => None,
    };

    let registry = registry(ctx).await?;
    let stopped = registry.lock().await.stop(msg.channel_id, kind);
    tracing::info!("Stopped {} live view(s) in channel {}", stopped, msg.channel_id);

    let text = if stopped == 0 {
        "No live views running in this channel.".to_string()
    } else {
        format!("Stopped {} live view(s).", stopped)
    };
    notice(ctx, msg, text).await
}

async fn set(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let (field, value) = match args {
        [field, value @ ..] if !value.is_empty() => (*field, value.join(" ")),
        _ => return Err("❌ Usage: `$live set <timeframe|type|pct|symbols> <value>`".to_string()),
    };

    let state = super::app_state(ctx).await?;
    let registry = registry(ctx).await?;
    let live_chart = registry.lock().await.chart(msg.channel_id);
    let (message_id, view) = live_chart.ok_or_else(|| {
        "❌ No live chart in this channel. Start one with `$live chart <SYMBOLS>`".to_string()
    })?;

    let params = view.apply_setting(field, &value)?;
    tracing::info!("Live chart in {} now {:?}", msg.channel_id, params);

    // Any refresh already in flight for the old parameters is discarded
    live::refresh_chart(ctx, msg.channel_id, message_id, &view, live_settings(&state.config)).await;
    Ok(())
}
