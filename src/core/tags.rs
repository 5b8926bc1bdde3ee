//! Decoding of the `key=value` tag block that prefixes a tagged PRIVMSG.
//!
//! Malformed entries inside `badges` and `emotes` are dropped one at a time.
//! An entry missing its separator (a badge without `/`, an emote group
//! without `:`, a range without `-`) means the line is not what we think it
//! is, so the whole record fails and the caller discards the message.

use crate::models::{
    badge::BadgeRef,
    emote::{EmotePlacement, EmoteUrlTemplate},
    message::MessageAttributes,
};
use eyre::eyre;

#[derive(Clone, Debug, Default)]
pub struct TagParser {
    emote_urls: EmoteUrlTemplate,
}

impl TagParser {
    pub fn new(emote_urls: EmoteUrlTemplate) -> Self {
        Self { emote_urls }
    }

    /// Builds the attribute record for one line. Missing optional tags leave
    /// the sentinel defaults in place.
    pub fn parse<'a, I>(&self, tags: I) -> Result<MessageAttributes, eyre::Report>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut record = MessageAttributes::default();

        for tag in tags {
            let Some((key, value)) = tag.split_once('=') else {
                continue;
            };

            match key {
                "display-name" => record.display_name = value.to_string(),
                "color" => record.color = value.to_string(),
                "badges" => record.badges.extend(parse_badges(value)?),
                "emotes" => record.emotes = self.parse_emotes(value)?,
                _ => {}
            }
        }

        Ok(record)
    }

    fn parse_emotes(&self, value: &str) -> Result<Vec<EmotePlacement>, eyre::Report> {
        let mut placements = Vec::new();

        for group in value.split('/').filter(|g| !g.is_empty()) {
            let (emote_id, ranges) = group
                .split_once(':')
                .ok_or_else(|| eyre!("emote group {:?} has no ':' separator", group))?;
            let locator = self.emote_urls.locator(emote_id);

            for range in ranges.split(',').filter(|r| !r.is_empty()) {
                let Some((start, end)) = parse_range(range)? else {
                    tracing::debug!("Dropping malformed emote range {:?}", range);
                    continue;
                };
                placements.push(EmotePlacement {
                    emote_id: emote_id.to_string(),
                    locator: locator.clone(),
                    start,
                    end,
                });
            }
        }

        Ok(placements)
    }
}

fn parse_badges(value: &str) -> Result<Vec<BadgeRef>, eyre::Report> {
    let mut badges = Vec::new();

    for entry in value.split(',').filter(|e| !e.is_empty()) {
        let (name, kind) = entry
            .split_once('/')
            .ok_or_else(|| eyre!("badge {:?} has no '/' separator", entry))?;

        if !is_badge_name(name) || !is_number(kind) {
            tracing::debug!("Dropping malformed badge {:?}", entry);
            continue;
        }

        badges.push(BadgeRef {
            name: name.to_string(),
            kind: kind.to_string(),
        });
    }

    Ok(badges)
}

/// `Ok(None)` for a range with a dash but non-numeric bounds.
fn parse_range(range: &str) -> Result<Option<(usize, usize)>, eyre::Report> {
    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| eyre!("emote range {:?} has no '-' separator", range))?;

    if !is_number(start) || !is_number(end) {
        return Ok(None);
    }

    match (start.parse(), end.parse()) {
        (Ok(start), Ok(end)) => Ok(Some((start, end))),
        _ => Ok(None),
    }
}

fn is_badge_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
