use crate::models::emote::EmoteUrlTemplate;
use eyre::{Context, eyre};
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const BASE_CONFIG_PATH: &str = "config/app_config.toml";
const ENV_PREFIX: &str = "CHATSPLICE_";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct IrcSettings {
    pub ws_addr: String,
    pub nick: String,
    pub pass: String,
    pub channel: String,
    pub reconnect_delay_secs: u64,
}

impl Default for IrcSettings {
    fn default() -> Self {
        Self {
            ws_addr: "wss://irc-ws.chat.twitch.tv:443".to_string(),
            nick: "justinfan123".to_string(),
            pass: "blah".to_string(),
            channel: String::new(),
            reconnect_delay_secs: 2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EmoteSettings {
    pub url_template: String,
}

impl Default for EmoteSettings {
    fn default() -> Self {
        Self {
            url_template: "https://static-cdn.jtvnw.net/emoticons/v2/{id}/default/light/1.0"
                .to_string(),
        }
    }
}

impl EmoteSettings {
    pub fn template(&self) -> EmoteUrlTemplate {
        EmoteUrlTemplate::new(self.url_template.clone())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BadgeSettings {
    pub client_id: Option<String>,
    pub access_token: Option<String>,
    pub broadcaster_id: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OverlaySettings {
    pub output: PathBuf,
    pub viewport_rows: usize,
    pub viewport_columns: usize,
    pub show_timestamps: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            output: PathBuf::from("overlay.html"),
            viewport_rows: 20,
            viewport_columns: 48,
            show_timestamps: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub irc: IrcSettings,
    pub emotes: EmoteSettings,
    pub badges: BadgeSettings,
    pub overlay: OverlaySettings,
}

impl Config {
    pub fn validate(&self) -> Result<(), eyre::Report> {
        let addr = url::Url::parse(&self.irc.ws_addr)
            .with_context(|| format!("Invalid ws_addr {:?}", self.irc.ws_addr))?;
        if !matches!(addr.scheme(), "ws" | "wss") {
            return Err(eyre!("ws_addr must use ws:// or wss://, got {}", addr.scheme()));
        }
        if self.irc.channel.trim().is_empty() {
            return Err(eyre!("irc.channel must be set"));
        }
        if !self
            .emotes
            .url_template
            .contains(EmoteUrlTemplate::PLACEHOLDER)
        {
            return Err(eyre!(
                "emotes.url_template must contain {}",
                EmoteUrlTemplate::PLACEHOLDER
            ));
        }
        if self.overlay.viewport_rows == 0 || self.overlay.viewport_columns == 0 {
            return Err(eyre!("overlay viewport dimensions must be non-zero"));
        }
        Ok(())
    }

    /// Channel name without a leading `#`, lowercased as IRC expects.
    pub fn channel(&self) -> String {
        self.irc.channel.trim().trim_start_matches('#').to_lowercase()
    }
}

fn get_config_path() -> Result<PathBuf, eyre::Report> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| eyre!("Could not find a config directory"))?
        .join(env!("CARGO_PKG_NAME"));

    Ok(config_dir.join("app_config.toml"))
}

fn layered(base: &Path, user: &Path) -> Figment {
    Figment::new()
        .merge(Toml::file(base))
        .merge(Toml::file(user))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub async fn load() -> Result<Config, eyre::Report> {
    let user_config_path = get_config_path()?;
    tracing::info!("Loading user config from {:?}", user_config_path);
    tracing::info!("Loading base config from {:?}", BASE_CONFIG_PATH);

    let config: Config = layered(Path::new(BASE_CONFIG_PATH), &user_config_path)
        .extract()
        .context("Could not load config")?;

    if !user_config_path.exists() {
        if let Err(e) = save_to(&config, &user_config_path).await {
            tracing::warn!("Failed to save initial config: {}", e);
        }
    }

    config.validate()?;
    Ok(config)
}

async fn save_to(config: &Config, path: &Path) -> Result<(), eyre::Report> {
    tracing::info!("Saving config to {:?}", path);

    let bytes = toml::to_string_pretty(config).context("Failed to serialize config")?;

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }
    }

    let mut file = tokio::fs::File::create(path)
        .await
        .context("Failed to create config file")?;

    file.write_all(bytes.as_bytes())
        .await
        .context("Failed to write config to file")?;

    Ok(())
}
