use crate::{
    app::config::IrcSettings,
    events::app_event::{AppEvent, ConnectionEvent, IrcEvent},
};
use eyre::eyre;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

/// A tagged PRIVMSG split into its tag block, channel, and body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivMsg {
    pub tags: String,
    pub channel: String,
    pub body: String,
}

impl PrivMsg {
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.split(';')
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IrcLine {
    /// Payload to echo back in the `PONG`.
    Ping(String),
    PrivMsg(PrivMsg),
    Other,
}

/// Classifies one raw protocol line.
pub fn parse_line(line: &str) -> IrcLine {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(payload) = line.strip_prefix("PING") {
        return IrcLine::Ping(payload.trim_start().to_string());
    }

    let Some(rest) = line.strip_prefix('@') else {
        return IrcLine::Other;
    };
    let Some((tags, command)) = rest.split_once(' ') else {
        return IrcLine::Other;
    };

    // command: ":nick!user@host PRIVMSG #channel :body"
    let Some(index) = command.find(" PRIVMSG ") else {
        return IrcLine::Other;
    };
    let params = &command[index + " PRIVMSG ".len()..];
    let Some((channel, body)) = params.split_once(' ') else {
        return IrcLine::Other;
    };

    IrcLine::PrivMsg(PrivMsg {
        tags: tags.to_string(),
        channel: channel.trim_start_matches('#').to_string(),
        body: body.strip_prefix(':').unwrap_or(body).to_string(),
    })
}

/// Reconnect delay that doubles after every failed session, up to
/// [`MAX_RECONNECT_DELAY`].
#[derive(Debug)]
struct Backoff {
    initial: Duration,
    current: Duration,
}

impl Backoff {
    fn new(initial: Duration) -> Self {
        Self {
            initial,
            current: initial,
        }
    }

    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(MAX_RECONNECT_DELAY);
        delay
    }

    fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Anonymous read-only chat connection over the IRC websocket gateway.
pub struct IrcClient {
    settings: IrcSettings,
    channel: String,
    event_tx: mpsc::Sender<AppEvent>,
}

impl IrcClient {
    pub fn new(settings: IrcSettings, channel: String, event_tx: mpsc::Sender<AppEvent>) -> Self {
        Self {
            settings,
            channel,
            event_tx,
        }
    }

    /// Keeps a connection open until the event receiver goes away,
    /// reconnecting with exponential back-off.
    pub async fn run(self) {
        let mut backoff = Backoff::new(Duration::from_secs(
            self.settings.reconnect_delay_secs.max(1),
        ));

        loop {
            match self.run_once(&mut backoff).await {
                Ok(()) => {
                    tracing::info!("Event channel closed, stopping IRC client.");
                    return;
                }
                Err(e) => {
                    tracing::error!("IRC connection failed: {}", e);
                    let closed = AppEvent::Connection(ConnectionEvent::Closed(e.to_string()));
                    if !self.send(closed).await {
                        return;
                    }
                }
            }

            let delay = backoff.next_delay();
            tracing::info!("Reconnecting in {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }

    /// Returns `Ok` only when the UI side stopped listening. Resets
    /// `backoff` once the channel has been joined.
    async fn run_once(&self, backoff: &mut Backoff) -> Result<(), eyre::Report> {
        let (ws_stream, _) = connect_async(self.settings.ws_addr.as_str()).await?;
        tracing::info!("WebSocket handshake has been successfully completed");
        let (mut write, mut read) = ws_stream.split();

        write.send(WsMessage::text("CAP REQ :twitch.tv/tags")).await?;
        write
            .send(WsMessage::text(format!("PASS {}", self.settings.pass)))
            .await?;
        write
            .send(WsMessage::text(format!("NICK {}", self.settings.nick)))
            .await?;
        write
            .send(WsMessage::text(format!("JOIN #{}", self.channel)))
            .await?;

        if !self
            .send(AppEvent::Connection(ConnectionEvent::Connected(self.channel.clone())))
            .await
        {
            return Ok(());
        }
        backoff.reset();

        while let Some(msg) = read.next().await {
            let text = match msg? {
                WsMessage::Text(text) => text,
                WsMessage::Close(c) => {
                    tracing::info!("Websocket closed: {:?}", c);
                    return Err(eyre!("WebSocket connection closed"));
                }
                _ => continue,
            };

            for line in text.as_str().split("\r\n").filter(|l| !l.is_empty()) {
                match parse_line(line) {
                    IrcLine::Ping(payload) => {
                        tracing::trace!("PING {}", payload);
                        write.send(WsMessage::text(format!("PONG {}", payload))).await?;
                    }
                    IrcLine::PrivMsg(msg) => {
                        if !self.send(AppEvent::Irc(IrcEvent::PrivMsg(msg))).await {
                            return Ok(());
                        }
                    }
                    IrcLine::Other => {
                        tracing::trace!("Ignoring line: {}", line);
                    }
                }
            }
        }

        Err(eyre!("WebSocket stream ended"))
    }

    /// False once the receiver has been dropped.
    async fn send(&self, event: AppEvent) -> bool {
        if self.event_tx.send(event).await.is_err() {
            tracing::error!("Failed to send message to UI thread: channel is closed.");
            return false;
        }
        true
    }
}
