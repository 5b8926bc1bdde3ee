use super::state::{ConnectionStatus, OverlayState};
use crate::{
    events::app_event::{AppEvent, ChatEvent, ConnectionEvent},
    models::message::ChatMessage,
};

/// Applies one event to the state. PRIVMSG events are not handled here;
/// the driver turns them into `ChatEvent`s first.
pub fn reduce(state: &mut OverlayState, event: AppEvent) {
    match event {
        AppEvent::Connection(connection_event) => {
            handle_connection_event(state, connection_event);
        }
        AppEvent::Chat(chat_event) => {
            handle_chat_event(state, chat_event);
        }
        AppEvent::Irc(irc_event) => {
            tracing::warn!("Unprocessed IRC event reached the reducer: {:?}", irc_event);
        }
    }
}

fn handle_connection_event(state: &mut OverlayState, event: ConnectionEvent) {
    match event {
        ConnectionEvent::Connected(channel) => {
            tracing::info!("Joined #{}", channel);
            state.connection = ConnectionStatus::Joined(channel);
        }
        ConnectionEvent::Closed(reason) => {
            tracing::warn!("Disconnected: {}", reason);
            state.connection = ConnectionStatus::Disconnected(reason);
        }
    }
}

fn handle_chat_event(state: &mut OverlayState, event: ChatEvent) {
    match event {
        ChatEvent::NewChatMessage(message) => {
            handle_new_message(state, message);
        }
        ChatEvent::MessageDiscarded(reason) => {
            state.counters.discarded += 1;
            tracing::warn!("Discarded message: {}", reason);
        }
    }
}

fn handle_new_message(state: &mut OverlayState, message: ChatMessage) {
    tracing::debug!(
        "{}: {} segments covering {} chars",
        message.sender_name,
        message.segments.len(),
        message.body_len()
    );
    state.window.push(message);
    state.counters.rendered += 1;

    let visible = state.viewport.visible_ids(state.window.units());
    let evicted = state.window.prune(|unit| visible.contains(&unit.id));
    state.counters.evicted += evicted as u64;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::retention::tests::unit,
        core::{irc::PrivMsg, pipeline::MessagePipeline},
        emotes::cache::{AssetCache, tests::StubFetcher},
        models::{badge::BadgeCatalog, emote::EmoteUrlTemplate, message::Segment},
        ui::overlay::Viewport,
    };
    use std::sync::Arc;

    fn state(rows: usize) -> OverlayState {
        OverlayState::new(Viewport { rows, columns: 100 })
    }

    #[test]
    fn appends_and_prunes_offscreen_messages() {
        let mut state = state(2);
        for id in 0..4 {
            reduce(&mut state, AppEvent::Chat(ChatEvent::NewChatMessage(unit(id, "hi"))));
        }

        let ids: Vec<_> = state.window.units().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(state.counters.rendered, 4);
        assert_eq!(state.counters.evicted, 2);
    }

    #[tokio::test]
    async fn keeps_spliced_segments_unchanged() {
        let pipeline = MessagePipeline::new(
            EmoteUrlTemplate::new("http://cdn/{id}"),
            AssetCache::new(Arc::new(StubFetcher::default())),
            Arc::new(BadgeCatalog::default()),
        );
        let body = "Kappa  ";
        let message = pipeline
            .process(
                0,
                PrivMsg {
                    tags: "emotes=25:0-4".to_string(),
                    channel: "streamer".to_string(),
                    body: body.to_string(),
                },
            )
            .await
            .unwrap();
        let spliced = message.segments.clone();

        let mut state = state(5);
        reduce(&mut state, AppEvent::Chat(ChatEvent::NewChatMessage(message)));

        let retained = &state.window.units()[0];
        assert_eq!(retained.segments, spliced);
        assert_eq!(retained.segments[1], Segment::Text("  ".to_string()));
        assert_eq!(retained.body_len(), body.chars().count());
    }

    #[test]
    fn tracks_discards_and_connection() {
        let mut state = state(5);
        reduce(
            &mut state,
            AppEvent::Chat(ChatEvent::MessageDiscarded("bad tags".to_string())),
        );
        reduce(
            &mut state,
            AppEvent::Connection(ConnectionEvent::Connected("streamer".to_string())),
        );

        assert_eq!(state.counters.discarded, 1);
        assert!(state.window.is_empty());
        assert_eq!(state.connection, ConnectionStatus::Joined("streamer".to_string()));
    }
}
