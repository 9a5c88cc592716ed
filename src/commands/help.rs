use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let embed = CreateEmbed::default()
        .title("📖 Stock Dashboard Help")
        .description("Market dashboard with quotes, watchlist and price charts.")
        .color(0x00b0f4)
        .field(
            "🎯 Pages",
            "`$dashboard` - Chart, watchlist and market overview\n`$portfolio` - Holdings, allocation and performance\n`$help` - Show this help message",
            false,
        )
        .field(
            "📈 Charts",
            "`$chart <SYMBOLS|preset> [timeframe] [line|area|bar] [pct]` - Price chart\nTimeframes: 1w, 1m, 3m, 6m, 1y, all\nPresets: tech, faang",
            false,
        )
        .field(
            "🏷️ Quotes",
            "`$stock <SYMBOL> [timeframe]` - Quote details and chart\n`$watchlist` - Watchlist table",
            false,
        )
        .field(
            "🧾 Trading",
            "`$buy <SYMBOL> [shares]` / `$sell <SYMBOL> [shares]` - Order preview (no order is placed)",
            false,
        )
        .field(
            "🔴 Live Views",
            "`$live watchlist` / `$live stock <SYMBOL>` / `$live chart <SYMBOLS> [options]` - Self-updating message\n`$live set <timeframe|type|pct|symbols> <value>` - Change the live chart\n`$live stop [watchlist|stock|chart]` - Stop live views in this channel",
            false,
        )
        .field(
            "⚡ Rate Limiting",
            "5-second cooldown per command per user\nGlobal 50 requests/second limit",
            false,
        );

    super::reply(ctx, msg, vec![embed], None)
        .await
        .map_err(|e| format!("Failed to send help message: {}", e))
}
