mod app;
mod core;
mod emotes;
mod events;
mod models;
mod ui;
mod utils;

use app::{config, driver, state::OverlayState};
use crate::core::{irc::IrcClient, pipeline::MessagePipeline};
use emotes::{cache::AssetCache, fetch::HttpFetcher, twitch_api};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use ui::overlay::{HtmlOverlay, Viewport};

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    // Setup file-based logging
    let file_appender = tracing_appender::rolling::never(".", "chatsplice.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(non_blocking)
        .init();

    let config = config::load().await?;
    let channel = config.channel();

    // The badge catalog is fixed for the whole session.
    let badges = Arc::new(twitch_api::load_badge_catalog(&config.badges).await?);

    let cache = AssetCache::new(Arc::new(HttpFetcher::new()?));
    let pipeline = MessagePipeline::new(config.emotes.template(), cache, badges);

    let overlay = HtmlOverlay::new(&config.overlay);
    let mut state = OverlayState::new(Viewport {
        rows: config.overlay.viewport_rows,
        columns: config.overlay.viewport_columns,
    });

    let (event_tx, event_rx) = mpsc::channel(100);
    let irc = IrcClient::new(config.irc.clone(), channel.clone(), event_tx);
    let irc_task = tokio::spawn(irc.run());

    tracing::info!("Rendering #{} to {:?}", channel, config.overlay.output);
    tokio::select! {
        _ = driver::run(event_rx, pipeline, &mut state, &overlay) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down.");
        }
    }

    irc_task.abort();
    Ok(())
}
