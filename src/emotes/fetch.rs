use crate::models::asset::Asset;
use async_trait::async_trait;
use eyre::Context;
use reqwest::{Client as ReqwestClient, header::CONTENT_TYPE};
use std::time::Duration;

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const FALLBACK_CONTENT_TYPE: &str = "image/png";

/// Fetches a remote resource and turns it into its local representation.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, locator: &str) -> Result<Asset, eyre::Report>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: ReqwestClient,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, eyre::Report> {
        let client = ReqwestClient::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, locator: &str) -> Result<Asset, eyre::Report> {
        let response = self
            .client
            .get(locator)
            .send()
            .await
            .with_context(|| format!("Failed to request {}", locator))?
            .error_for_status()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {}", locator))?;

        Ok(Asset::from_bytes(locator, content_type, &bytes))
    }
}
