use super::{asset::AssetHandle, badge::BadgeRef, emote::EmotePlacement};
use chrono::{DateTime, Local};

pub const DEFAULT_DISPLAY_NAME: &str = "error";
pub const DEFAULT_COLOR: &str = "#FF00FF";

/// Everything the tag block of one PRIVMSG says about its sender and body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageAttributes {
    pub display_name: String,
    pub color: String,
    pub badges: Vec<BadgeRef>,
    pub emotes: Vec<EmotePlacement>,
}

impl Default for MessageAttributes {
    fn default() -> Self {
        Self {
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            color: DEFAULT_COLOR.to_string(),
            badges: Vec::new(),
            emotes: Vec::new(),
        }
    }
}

/// One contiguous piece of a spliced message body.
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Text(String),
    /// `name` is the text the emote replaced.
    Asset { name: String, handle: AssetHandle },
}

impl Segment {
    /// The source text this segment covers.
    pub fn source_text(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Asset { name, .. } => name,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BadgeIcon {
    pub badge: BadgeRef,
    pub description: String,
    pub handle: AssetHandle,
}

/// A fully assembled message, ready to be shown.
#[derive(Clone, Debug)]
pub struct ChatMessage {
    /// Arrival sequence number.
    pub id: u64,
    pub sender_name: String,
    pub sender_color: String,
    pub badges: Vec<BadgeIcon>,
    pub segments: Vec<Segment>,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    /// Number of code points the body covers, counting each emote as the
    /// text it replaced.
    pub fn body_len(&self) -> usize {
        self.segments
            .iter()
            .map(|s| s.source_text().chars().count())
            .sum()
    }
}
