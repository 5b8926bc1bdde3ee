use crate::{
    emotes::cache::AssetCache,
    models::{
        badge::BadgeCatalog,
        message::{BadgeIcon, ChatMessage, MessageAttributes, Segment},
    },
};
use chrono::Local;
use std::sync::Arc;

/// Joins parsed attributes, badge icons and the spliced body into one
/// displayable message.
#[derive(Clone)]
pub struct RenderAssembler {
    cache: AssetCache,
    badges: Arc<BadgeCatalog>,
}

impl RenderAssembler {
    pub fn new(cache: AssetCache, badges: Arc<BadgeCatalog>) -> Self {
        Self { cache, badges }
    }

    pub async fn assemble(
        &self,
        id: u64,
        attributes: MessageAttributes,
        segments: Vec<Segment>,
    ) -> Result<ChatMessage, eyre::Report> {
        let mut badges = Vec::with_capacity(attributes.badges.len());

        for badge in &attributes.badges {
            // Channel badges are unknown when no broadcaster is configured.
            let Some(resolved) = self.badges.resolve(badge) else {
                tracing::trace!("Skipping unknown badge {}/{}", badge.name, badge.kind);
                continue;
            };

            let handle = self.cache.load(&resolved.image_url).await?;
            badges.push(BadgeIcon {
                badge: resolved.badge,
                description: resolved.description,
                handle,
            });
        }

        Ok(ChatMessage {
            id,
            sender_name: attributes.display_name,
            sender_color: attributes.color,
            badges,
            segments,
            timestamp: Local::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotes::cache::tests::StubFetcher;
    use crate::models::badge::{BadgeCatalogFile, BadgeRef};

    fn catalog() -> Arc<BadgeCatalog> {
        let json = r#"{"badge_sets": {
            "subscriber": {"description": "Subscriber", "versions": {"1": {"image_url_1x": "http://b/sub1.png"}}},
            "vip": {"versions": {"1": {"image_url_1x": "http://b/vip.png", "title": "VIP"}}}
        }}"#;
        Arc::new(serde_json::from_str::<BadgeCatalogFile>(json).unwrap().badge_sets)
    }

    fn badge(name: &str, kind: &str) -> BadgeRef {
        BadgeRef {
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }

    #[tokio::test]
    async fn resolves_badges_and_keeps_attributes() {
        let fetcher = Arc::new(StubFetcher::default());
        let assembler = RenderAssembler::new(AssetCache::new(fetcher.clone()), catalog());

        let attributes = MessageAttributes {
            display_name: "Foo".to_string(),
            color: "#112233".to_string(),
            badges: vec![badge("subscriber", "12"), badge("moderator", "1"), badge("vip", "1")],
            emotes: Vec::new(),
        };
        let message = assembler
            .assemble(7, attributes, vec![Segment::Text("hi".to_string())])
            .await
            .unwrap();

        assert_eq!(message.id, 7);
        assert_eq!(message.sender_name, "Foo");
        assert_eq!(message.sender_color, "#112233");
        assert_eq!(message.badges.len(), 2);
        assert_eq!(message.badges[0].badge, badge("subscriber", "1"));
        assert_eq!(message.badges[0].description, "Subscriber");
        assert_eq!(message.badges[0].handle.locator, "http://b/sub1.png");
        assert_eq!(message.badges[1].description, "VIP");
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn badge_fetch_failure_fails_the_message() {
        let fetcher = Arc::new(StubFetcher::default());
        fetcher.failing.lock().insert("http://b/vip.png".to_string());
        let assembler = RenderAssembler::new(AssetCache::new(fetcher), catalog());

        let attributes = MessageAttributes {
            badges: vec![badge("vip", "1")],
            ..Default::default()
        };
        assert!(assembler.assemble(0, attributes, Vec::new()).await.is_err());
    }
}
