use crate::{
    emotes::cache::AssetCache,
    models::{emote::EmotePlacement, message::Segment},
};

/// A segment together with the code point range of the body it covers.
struct Span {
    start: usize,
    len: usize,
    segment: Segment,
}

impl Span {
    /// True when this is a text span that fully contains `[start, end]`.
    fn contains(&self, placement: &EmotePlacement) -> bool {
        matches!(self.segment, Segment::Text(_))
            && self.start <= placement.start
            && placement.end < self.start + self.len
    }
}

/// Cuts a message body into text runs and emote images.
#[derive(Clone)]
pub struct SegmentSplicer {
    cache: AssetCache,
}

impl SegmentSplicer {
    pub fn new(cache: AssetCache) -> Self {
        Self { cache }
    }

    /// Applies `placements` in order. Placements that are inverted, out of
    /// bounds, or overlap a range an earlier placement already took are
    /// skipped. Fails only when an emote image cannot be loaded.
    pub async fn splice(
        &self,
        message: &str,
        placements: &[EmotePlacement],
    ) -> Result<Vec<Segment>, eyre::Report> {
        let mut spans = vec![Span {
            start: 0,
            len: message.chars().count(),
            segment: Segment::Text(message.to_string()),
        }];

        for placement in placements {
            if placement.end < placement.start {
                tracing::debug!(
                    "Skipping inverted emote range {}-{}",
                    placement.start,
                    placement.end
                );
                continue;
            }

            let Some(index) = spans.iter().position(|s| s.contains(placement)) else {
                tracing::debug!(
                    "Skipping emote range {}-{}: not inside a text run",
                    placement.start,
                    placement.end
                );
                continue;
            };

            let span_start = spans[index].start;
            let chars: Vec<char> = spans[index].segment.source_text().chars().collect();
            let from = placement.start - span_start;
            let to = placement.end - span_start + 1;

            let before: String = chars[..from].iter().collect();
            let name: String = chars[from..to].iter().collect();
            let after: String = chars[to..].iter().collect();

            let handle = self.cache.load(&placement.locator).await?;

            let mut replacement = Vec::with_capacity(3);
            if !before.is_empty() {
                replacement.push(Span {
                    start: span_start,
                    len: from,
                    segment: Segment::Text(before),
                });
            }
            replacement.push(Span {
                start: placement.start,
                len: to - from,
                segment: Segment::Asset { name, handle },
            });
            if !after.is_empty() {
                replacement.push(Span {
                    start: placement.end + 1,
                    len: chars.len() - to,
                    segment: Segment::Text(after),
                });
            }

            spans.splice(index..=index, replacement);
        }

        Ok(spans.into_iter().map(|s| s.segment).collect())
    }
}
