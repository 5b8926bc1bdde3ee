use super::{irc::PrivMsg, splice::SegmentSplicer, tags::TagParser};
use crate::{
    app::assembler::RenderAssembler,
    emotes::cache::AssetCache,
    models::{badge::BadgeCatalog, emote::EmoteUrlTemplate, message::ChatMessage},
};
use eyre::Context;
use std::sync::Arc;

/// Raw PRIVMSG in, assembled [`ChatMessage`] out.
#[derive(Clone)]
pub struct MessagePipeline {
    cache: AssetCache,
    parser: TagParser,
    splicer: SegmentSplicer,
    assembler: RenderAssembler,
}

impl MessagePipeline {
    pub fn new(emote_urls: EmoteUrlTemplate, cache: AssetCache, badges: Arc<BadgeCatalog>) -> Self {
        Self {
            parser: TagParser::new(emote_urls),
            splicer: SegmentSplicer::new(cache.clone()),
            assembler: RenderAssembler::new(cache.clone(), badges),
            cache,
        }
    }

    /// Number of emote and badge images loaded so far.
    pub fn cached_assets(&self) -> usize {
        self.cache.len()
    }

    pub async fn process(&self, id: u64, msg: PrivMsg) -> Result<ChatMessage, eyre::Report> {
        let attributes = self
            .parser
            .parse(msg.tags())
            .with_context(|| format!("Unusable tag block: {}", msg.tags))?;

        let segments = self.splicer.splice(&msg.body, &attributes.emotes).await?;
        tracing::trace!("Message {} spliced into {} segments", id, segments.len());

        self.assembler.assemble(id, attributes, segments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{emotes::cache::tests::StubFetcher, models::message::Segment};

    fn pipeline() -> MessagePipeline {
        MessagePipeline::new(
            EmoteUrlTemplate::new("http://cdn/{id}"),
            AssetCache::new(Arc::new(StubFetcher::default())),
            Arc::new(BadgeCatalog::default()),
        )
    }

    fn privmsg(tags: &str, body: &str) -> PrivMsg {
        PrivMsg {
            tags: tags.to_string(),
            channel: "streamer".to_string(),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn processes_a_message_end_to_end() {
        let message = pipeline()
            .process(3, privmsg("display-name=Foo;color=#112233;emotes=25:0-4", "Kappa hi"))
            .await
            .unwrap();

        assert_eq!(message.id, 3);
        assert_eq!(message.sender_name, "Foo");
        assert!(matches!(&message.segments[0], Segment::Asset { name, .. } if name == "Kappa"));
        assert_eq!(message.segments[1], Segment::Text(" hi".to_string()));
        assert_eq!(message.body_len(), 8);
    }

    #[tokio::test]
    async fn shares_the_cache_across_messages() {
        let pipeline = pipeline();
        for id in 0..3 {
            pipeline
                .process(id, privmsg("emotes=25:0-4", "Kappa"))
                .await
                .unwrap();
        }
        pipeline
            .process(3, privmsg("emotes=1:0-2", "LUL"))
            .await
            .unwrap();

        assert_eq!(pipeline.cached_assets(), 2);
    }

    #[tokio::test]
    async fn structural_tag_failure_rejects_the_message() {
        let result = pipeline()
            .process(0, privmsg("emotes=25:04", "Kappa"))
            .await;
        assert!(result.is_err());
    }
}
