use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod models;
mod services;
mod utils;
mod views;

use api::TiingoClient;
use config::Config;
use views::{LiveRegistry, LiveViews};

/// Config and the market data client shared by every command
pub struct AppState {
    pub config: Config,
    pub api: Arc<TiingoClient>,
}

struct Handler;

pub struct SharedState;

impl TypeMapKey for SharedState {
    type Value = Arc<AppState>;
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        commands::handle_message(&ctx, &msg).await;
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected to {} guild(s)!", ready.user.name, ready.guilds.len());
    }
}

fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["stock_dashboard=debug", "serenity=warn"] {
        match directive.parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("Invalid log directive {}: {}", directive, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    info!("📈 Starting stock dashboard bot v{}...", env!("CARGO_PKG_VERSION"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    info!(
        "Quotes from {} ({} watchlist symbols{})",
        config.tiingo_base_url,
        config.watchlist.len(),
        if config.watchlist_url.is_some() { ", remote watchlist" } else { "" }
    );

    let api = Arc::new(config.tiingo_client());
    let token = config.discord_token.clone();
    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES;

    let mut client = match Client::builder(&token, intents).event_handler(Handler).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create client: {}", e);
            return;
        }
    };

    // Store shared state and the live view registry in client data
    {
        let mut data = client.data.write().await;
        data.insert::<SharedState>(Arc::new(AppState { config, api }));
        data.insert::<LiveRegistry>(Arc::new(Mutex::new(LiveViews::default())));
    }

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }
}
