use super::retention::RetentionWindow;
use crate::ui::overlay::Viewport;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Joined(String),
    Disconnected(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub rendered: u64,
    pub discarded: u64,
    pub evicted: u64,
}

/// Everything the driver mutates while consuming the chat stream.
#[derive(Debug)]
pub struct OverlayState {
    pub window: RetentionWindow,
    pub viewport: Viewport,
    pub connection: ConnectionStatus,
    pub counters: Counters,
}

impl OverlayState {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            window: RetentionWindow::default(),
            viewport,
            connection: ConnectionStatus::default(),
            counters: Counters::default(),
        }
    }
}
