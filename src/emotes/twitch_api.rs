use crate::{
    app::config::BadgeSettings,
    models::badge::{BadgeCatalog, BadgeCatalogFile, BadgeSet, BadgeVersion},
};
use eyre::{Context, eyre};
use reqwest::{
    RequestBuilder,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::Deserialize;
use std::collections::HashMap;

const HELIX_BADGES_URL: &str = "https://api.twitch.tv/helix/chat/badges";

#[derive(Debug, Deserialize)]
struct HelixBadgeVersion {
    id: String,
    image_url_1x: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct HelixBadgeSet {
    set_id: String,
    versions: Vec<HelixBadgeVersion>,
}

#[derive(Debug, Deserialize)]
struct BadgesResponse {
    data: Vec<HelixBadgeSet>,
}

impl From<BadgesResponse> for BadgeCatalog {
    fn from(response: BadgesResponse) -> Self {
        let sets = response
            .data
            .into_iter()
            .map(|set| {
                let versions: HashMap<String, BadgeVersion> = set
                    .versions
                    .into_iter()
                    .map(|v| {
                        (
                            v.id,
                            BadgeVersion {
                                image_url_1x: v.image_url_1x,
                                title: v.title,
                            },
                        )
                    })
                    .collect();
                (
                    set.set_id,
                    BadgeSet {
                        description: String::new(),
                        versions,
                    },
                )
            })
            .collect();
        BadgeCatalog::new(sets)
    }
}

#[derive(Clone)]
pub struct TwitchApiClient {
    client: reqwest::Client,
    client_id: String,
    access_token: String,
}

impl TwitchApiClient {
    pub fn new(client_id: String, access_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id,
            access_token,
        }
    }

    pub async fn get_global_badges(&self) -> Result<BadgeCatalog, reqwest::Error> {
        self.get_badges(self.badges_request("/global", &[])).await
    }

    pub async fn get_channel_badges(
        &self,
        broadcaster_id: &str,
    ) -> Result<BadgeCatalog, reqwest::Error> {
        let request = self.badges_request("", &[("broadcaster_id", broadcaster_id)]);
        self.get_badges(request).await
    }

    fn badges_request(&self, path: &str, query: &[(&str, &str)]) -> RequestBuilder {
        self.client
            .get(format!("{}{}", HELIX_BADGES_URL, path))
            .query(query)
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .header("Client-Id", &self.client_id)
            .header(CONTENT_TYPE, "application/json")
    }

    async fn get_badges(&self, request: RequestBuilder) -> Result<BadgeCatalog, reqwest::Error> {
        let response = request
            .send()
            .await?
            .error_for_status()?
            .json::<BadgesResponse>()
            .await?;

        Ok(response.into())
    }
}

/// Builds the session's badge catalog: Helix global sets with channel sets
/// on top when credentials are configured, else a local catalog file, else
/// an empty catalog.
pub async fn load_badge_catalog(settings: &BadgeSettings) -> Result<BadgeCatalog, eyre::Report> {
    if let (Some(client_id), Some(access_token)) = (&settings.client_id, &settings.access_token) {
        let api = TwitchApiClient::new(client_id.clone(), access_token.clone());
        let mut catalog = api
            .get_global_badges()
            .await
            .context("Failed to fetch global badges")?;

        if let Some(broadcaster_id) = &settings.broadcaster_id {
            let channel = api
                .get_channel_badges(broadcaster_id)
                .await
                .context("Failed to fetch channel badges")?;
            catalog.merge(channel);
        }

        if catalog.is_empty() {
            tracing::warn!("Helix returned no badge sets, badges will not be shown.");
        } else {
            tracing::info!("Loaded {} badge sets from Helix", catalog.len());
        }
        return Ok(catalog);
    }

    if let Some(path) = &settings.file {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Could not read badge catalog {:?}", path))?;
        let file: BadgeCatalogFile =
            serde_json::from_slice(&bytes).context("Could not parse badge catalog")?;
        tracing::info!("Loaded {} badge sets from {:?}", file.badge_sets.len(), path);
        return Ok(file.badge_sets);
    }

    if settings.broadcaster_id.is_some() {
        return Err(eyre!(
            "broadcaster_id is set but client_id/access_token are missing"
        ));
    }

    tracing::warn!("No badge source configured, badges will not be shown.");
    Ok(BadgeCatalog::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::badge::BadgeRef;
    use std::io::Write;

    #[test]
    fn converts_helix_response() {
        let json = r#"{
            "data": [{
                "set_id": "vip",
                "versions": [{
                    "id": "1",
                    "image_url_1x": "http://b/vip1.png",
                    "image_url_2x": "http://b/vip2.png",
                    "image_url_4x": "http://b/vip4.png",
                    "title": "VIP",
                    "description": "VIP"
                }]
            }]
        }"#;
        let response: BadgesResponse = serde_json::from_str(json).unwrap();
        let catalog = BadgeCatalog::from(response);

        let resolved = catalog
            .resolve(&BadgeRef {
                name: "vip".to_string(),
                kind: "1".to_string(),
            })
            .unwrap();
        assert_eq!(resolved.image_url, "http://b/vip1.png");
        assert_eq!(resolved.description, "VIP");
    }

    #[test]
    fn channel_badges_request_encodes_broadcaster_id() {
        let api = TwitchApiClient::new("client".to_string(), "token".to_string());

        let request = api
            .badges_request("", &[("broadcaster_id", "12 3&x=1")])
            .build()
            .unwrap();
        assert_eq!(request.url().path(), "/helix/chat/badges");
        assert_eq!(request.url().query(), Some("broadcaster_id=12+3%26x%3D1"));
        assert_eq!(request.headers()["Client-Id"], "client");

        let global = api.badges_request("/global", &[]).build().unwrap();
        assert_eq!(global.url().path(), "/helix/chat/badges/global");
        assert_eq!(global.url().query(), None);
    }

    #[tokio::test]
    async fn loads_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"badge_sets": {{"vip": {{"versions": {{"1": {{"image_url_1x": "http://b/v.png"}}}}}}}}}}"#
        )
        .unwrap();

        let settings = BadgeSettings {
            file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let catalog = load_badge_catalog(&settings).await.unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn no_source_means_empty_catalog() {
        let catalog = load_badge_catalog(&BadgeSettings::default()).await.unwrap();
        assert!(catalog.is_empty());
    }
}
