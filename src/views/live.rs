//! Live views: posted messages re-rendered on a timer
//!
//! Each channel holds at most one live view per kind. Replacing or stopping
//! an entry drops its [`ScheduledTask`], which stops the timer.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage, EditAttachments, EditMessage};
use serenity::model::id::{ChannelId, MessageId};
use serenity::prelude::{Context, TypeMapKey};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::chart_view::{chart_message_parts, ChartView};
use super::quote_view::{detail_embed, watchlist_embed, DetailView, WatchlistView};
use crate::api::{MarketData, TiingoClient};
use crate::models::ChartParams;
use crate::utils::ScheduledTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiveKind {
    Watchlist,
    Detail,
    Chart,
}

impl LiveKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.to_lowercase().as_str() {
            "watchlist" | "wl" => Some(LiveKind::Watchlist),
            "stock" | "detail" => Some(LiveKind::Detail),
            "chart" => Some(LiveKind::Chart),
            _ => None,
        }
    }
}

impl fmt::Display for LiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LiveKind::Watchlist => "watchlist",
            LiveKind::Detail => "stock",
            LiveKind::Chart => "chart",
        })
    }
}

pub struct LiveEntry<A> {
    pub message_id: MessageId,
    pub chart: Option<Arc<ChartView<A>>>,
    task: ScheduledTask,
}

impl<A> LiveEntry<A> {
    pub fn new(message_id: MessageId, task: ScheduledTask) -> Self {
        Self {
            message_id,
            chart: None,
            task,
        }
    }

    pub fn with_chart(mut self, chart: Arc<ChartView<A>>) -> Self {
        self.chart = Some(chart);
        self
    }
}

/// Live views by channel and kind
pub struct LiveViews<A> {
    entries: HashMap<(ChannelId, LiveKind), LiveEntry<A>>,
}

impl<A> Default for LiveViews<A> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<A> LiveViews<A> {
    /// Register a live view; returns true when it replaced an older one,
    /// whose timer is stopped
    pub fn insert(&mut self, channel_id: ChannelId, kind: LiveKind, entry: LiveEntry<A>) -> bool {
        self.prune_finished();
        match self.entries.insert((channel_id, kind), entry) {
            Some(old) => {
                debug!("Replacing live {} in channel {} ({})", kind, channel_id, old.task.name());
                true
            }
            None => false,
        }
    }

    /// Tear down one kind, or every live view of the channel when `kind`
    /// is `None`. Returns how many were stopped.
    pub fn stop(&mut self, channel_id: ChannelId, kind: Option<LiveKind>) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|(channel, entry_kind), _| *channel != channel_id || kind.is_some_and(|k| k != *entry_kind));
        before - self.entries.len()
    }

    /// Live chart of a channel together with its message
    pub fn chart(&self, channel_id: ChannelId) -> Option<(MessageId, Arc<ChartView<A>>)> {
        self.entries
            .get(&(channel_id, LiveKind::Chart))
            .filter(|entry| !entry.task.is_finished())
            .and_then(|entry| entry.chart.clone().map(|chart| (entry.message_id, chart)))
    }

    /// Drop views whose lifetime has run out
    pub fn prune_finished(&mut self) {
        self.entries.retain(|_, entry| !entry.task.is_finished());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registry stored in the client data
pub struct LiveRegistry;

impl TypeMapKey for LiveRegistry {
    type Value = Arc<Mutex<LiveViews<TiingoClient>>>;
}

/// Timings for live views
#[derive(Debug, Clone, Copy)]
pub struct LiveSettings {
    pub quote_refresh: Duration,
    pub chart_refresh: Duration,
    pub lifetime: Duration,
    pub chart_width: u32,
    pub chart_height: u32,
}

fn live_footer(period: Duration) -> CreateEmbedFooter {
    CreateEmbedFooter::new(format!(
        "🔴 Live, refreshes every {}s · updated {} UTC · $live stop",
        period.as_secs(),
        Utc::now().format("%H:%M:%S")
    ))
}

fn loading_embed(title: &str) -> CreateEmbed {
    CreateEmbed::default()
        .title(title)
        .description("Loading...")
        .color(0x808080)
}

async fn post_placeholder(ctx: &Context, channel_id: ChannelId, title: &str) -> Result<MessageId, String> {
    channel_id
        .send_message(ctx, CreateMessage::default().embed(loading_embed(title)))
        .await
        .map(|message| message.id)
        .map_err(|e| format!("Failed to send live view: {}", e))
}

async fn edit_live(ctx: &Context, channel_id: ChannelId, message_id: MessageId, builder: EditMessage) {
    if let Err(e) = channel_id.edit_message(ctx, message_id, builder).await {
        warn!("Failed to update live view {} in {}: {}", message_id, channel_id, e);
    }
}

pub async fn start_watchlist<A: MarketData + 'static>(
    ctx: &Context,
    channel_id: ChannelId,
    api: Arc<A>,
    settings: LiveSettings,
) -> Result<LiveEntry<A>, String> {
    let message_id = post_placeholder(ctx, channel_id, "📋 Watchlist").await?;
    let view = Arc::new(WatchlistView::new(api));
    let ctx = ctx.clone();

    let task = ScheduledTask::every(
        format!("watchlist:{}", channel_id),
        settings.quote_refresh,
        Some(settings.lifetime),
        move || {
            let ctx = ctx.clone();
            let view = view.clone();
            async move {
                if let Some(rows) = view.refresh().await {
                    let embed = watchlist_embed(&rows).footer(live_footer(settings.quote_refresh));
                    edit_live(&ctx, channel_id, message_id, EditMessage::new().embed(embed)).await;
                }
            }
        },
    );

    info!("Started live watchlist in channel {}", channel_id);
    Ok(LiveEntry::new(message_id, task))
}

pub async fn start_detail<A: MarketData + 'static>(
    ctx: &Context,
    channel_id: ChannelId,
    api: Arc<A>,
    symbol: &str,
    settings: LiveSettings,
) -> Result<LiveEntry<A>, String> {
    let view = Arc::new(DetailView::new(api, symbol));
    let message_id = post_placeholder(ctx, channel_id, &format!("🏷️ {}", view.symbol())).await?;
    let ctx = ctx.clone();

    let task = ScheduledTask::every(
        format!("stock:{}:{}", view.symbol(), channel_id),
        settings.quote_refresh,
        Some(settings.lifetime),
        move || {
            let ctx = ctx.clone();
            let view = view.clone();
            async move {
                if let Some(snapshot) = view.refresh().await {
                    let embed = detail_embed(&snapshot).footer(live_footer(settings.quote_refresh));
                    edit_live(&ctx, channel_id, message_id, EditMessage::new().embed(embed)).await;
                }
            }
        },
    );

    info!("Started live quote for {} in channel {}", symbol, channel_id);
    Ok(LiveEntry::new(message_id, task))
}

pub async fn start_chart<A: MarketData + 'static>(
    ctx: &Context,
    channel_id: ChannelId,
    api: Arc<A>,
    params: ChartParams,
    settings: LiveSettings,
) -> Result<LiveEntry<A>, String> {
    let message_id = post_placeholder(ctx, channel_id, &format!("📈 {}", params.symbols.join(", "))).await?;
    let view = Arc::new(ChartView::new(api, params));
    let tick_view = view.clone();
    let ctx = ctx.clone();

    let task = ScheduledTask::every(
        format!("chart:{}", channel_id),
        settings.chart_refresh,
        Some(settings.lifetime),
        move || {
            let ctx = ctx.clone();
            let view = tick_view.clone();
            async move {
                refresh_chart(&ctx, channel_id, message_id, &view, settings).await;
            }
        },
    );

    info!("Started live chart in channel {}", channel_id);
    Ok(LiveEntry::new(message_id, task).with_chart(view))
}

/// Refresh a live chart and edit its message, unless a newer refresh
/// superseded this one
pub async fn refresh_chart<A: MarketData>(
    ctx: &Context,
    channel_id: ChannelId,
    message_id: MessageId,
    view: &ChartView<A>,
    settings: LiveSettings,
) {
    let Some(snapshot) = view.refresh(Utc::now().date_naive()).await else {
        return;
    };

    let (embed, image) = chart_message_parts(&snapshot, settings.chart_width, settings.chart_height);
    // An empty attachment list drops the previous image
    let attachments = match image {
        Some(image) => EditAttachments::new().add(image),
        None => EditAttachments::new(),
    };
    let builder = EditMessage::new()
        .embed(embed.footer(live_footer(settings.chart_refresh)))
        .attachments(attachments);
    edit_live(ctx, channel_id, message_id, builder).await;
}
