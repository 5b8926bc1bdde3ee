use super::{reducer, state::OverlayState};
use crate::{
    core::pipeline::MessagePipeline,
    events::app_event::{AppEvent, ChatEvent, IrcEvent},
    ui::overlay::HtmlOverlay,
};
use futures::{StreamExt, stream::FuturesOrdered};
use tokio::sync::mpsc;

/// Messages whose assets may be loading at the same time.
const MAX_IN_FLIGHT: usize = 32;

/// Consumes events until the sender side closes and every accepted message
/// has been processed.
///
/// Messages are processed concurrently but delivered to the reducer in
/// arrival order, so a slow emote fetch holds back later messages rather
/// than letting them overtake it.
pub async fn run(
    mut event_rx: mpsc::Receiver<AppEvent>,
    pipeline: MessagePipeline,
    state: &mut OverlayState,
    overlay: &HtmlOverlay,
) {
    let mut pending = FuturesOrdered::new();
    let mut next_id: u64 = 0;
    let mut open = true;

    while open || !pending.is_empty() {
        tokio::select! {
            event = event_rx.recv(), if open && pending.len() < MAX_IN_FLIGHT => match event {
                Some(AppEvent::Irc(IrcEvent::PrivMsg(msg))) => {
                    let pipeline = pipeline.clone();
                    let id = next_id;
                    next_id += 1;
                    pending.push_back(async move { pipeline.process(id, msg).await });
                }
                Some(event) => reducer::reduce(state, event),
                None => {
                    tracing::info!("Event channel closed, draining {} messages", pending.len());
                    open = false;
                }
            },
            Some(result) = pending.next(), if !pending.is_empty() => {
                let event = match result {
                    Ok(message) => ChatEvent::NewChatMessage(message),
                    Err(e) => ChatEvent::MessageDiscarded(format!("{:#}", e)),
                };
                let rendered = matches!(event, ChatEvent::NewChatMessage(_));
                reducer::reduce(state, AppEvent::Chat(event));

                if rendered {
                    if let Err(e) = overlay.write(state.window.units()).await {
                        tracing::error!("Failed to write overlay: {:#}", e);
                    }
                }
            }
        }
    }

    tracing::info!(
        "Driver stopped: {} rendered, {} discarded, {} evicted, {} assets cached",
        state.counters.rendered,
        state.counters.discarded,
        state.counters.evicted,
        pipeline.cached_assets()
    );
    if !state.window.is_empty() {
        tracing::info!("{} messages still on screen", state.window.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::config::OverlaySettings,
        core::irc::PrivMsg,
        emotes::cache::{AssetCache, tests::StubFetcher},
        models::{badge::BadgeCatalog, emote::EmoteUrlTemplate, message::Segment},
        ui::overlay::Viewport,
    };
    use std::{sync::Arc, time::Duration};

    fn privmsg(tags: &str, body: &str) -> AppEvent {
        AppEvent::Irc(IrcEvent::PrivMsg(PrivMsg {
            tags: tags.to_string(),
            channel: "streamer".to_string(),
            body: body.to_string(),
        }))
    }

    #[tokio::test]
    async fn delivers_in_arrival_order() {
        let dir = tempfile::tempdir().unwrap();
        let overlay = HtmlOverlay::new(&OverlaySettings {
            output: dir.path().join("overlay.html"),
            ..Default::default()
        });
        let fetcher = Arc::new(StubFetcher::with_delay(Duration::from_millis(50)));
        let pipeline = MessagePipeline::new(
            EmoteUrlTemplate::new("http://cdn/{id}"),
            AssetCache::new(fetcher),
            Arc::new(BadgeCatalog::default()),
        );
        let mut state = OverlayState::new(Viewport { rows: 50, columns: 80 });

        let (tx, rx) = mpsc::channel(8);
        // The first message waits on a slow emote fetch; the second needs none.
        tx.send(privmsg("display-name=Slow;emotes=25:0-4", "Kappa")).await.unwrap();
        tx.send(privmsg("display-name=Fast", "hello")).await.unwrap();
        tx.send(privmsg("emotes=25:0_4", "broken")).await.unwrap();
        drop(tx);

        run(rx, pipeline, &mut state, &overlay).await;

        let units = state.window.units();
        let names: Vec<_> = units.iter().map(|u| u.sender_name.as_str()).collect();
        assert_eq!(names, vec!["Slow", "Fast"]);
        assert_eq!(units[0].id, 0);
        assert_eq!(units[1].id, 1);
        assert!(matches!(units[0].segments[0], Segment::Asset { .. }));
        assert_eq!(state.counters.discarded, 1);
        assert_eq!(state.window.len(), 2);

        let html = std::fs::read_to_string(dir.path().join("overlay.html")).unwrap();
        assert!(html.contains("Fast"));
    }
}
