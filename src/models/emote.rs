/// One instruction to replace part of a message body with an emote image.
///
/// `start` and `end` are inclusive code point offsets into the message body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmotePlacement {
    pub emote_id: String,
    pub locator: String,
    pub start: usize,
    pub end: usize,
}

/// Turns an emote id into the URL its image is fetched from.
#[derive(Clone, Debug)]
pub struct EmoteUrlTemplate {
    template: String,
}

impl EmoteUrlTemplate {
    pub const PLACEHOLDER: &'static str = "{id}";

    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn locator(&self, emote_id: &str) -> String {
        self.template.replace(Self::PLACEHOLDER, emote_id)
    }
}

impl Default for EmoteUrlTemplate {
    fn default() -> Self {
        Self::new("https://static-cdn.jtvnw.net/emoticons/v2/{id}/default/light/1.0")
    }
}
