//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub mirrors: MirrorsConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    #[serde(default = "default_warmup")]
    pub warmup_secs: u64,

    #[serde(default = "default_posts_per_check")]
    pub posts_per_check: usize,

    #[serde(default = "default_handle_pace")]
    pub handle_pace_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorsConfig {
    #[serde(default = "default_mirror_urls")]
    pub urls: Vec<String>,

    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,

    #[serde(default = "default_attempt_pace")]
    pub attempt_pace_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_bot_token_env")]
    pub bot_token_env: String,

    /// Chat id auto-subscribed at run startup; 0 disables
    #[serde(default)]
    pub default_chat_id: i64,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_check_interval() -> u64 {
    300
}

fn default_warmup() -> u64 {
    10
}

fn default_posts_per_check() -> usize {
    20
}

fn default_handle_pace() -> u64 {
    1
}

fn default_mirror_urls() -> Vec<String> {
    vec![
        "https://nitter.net".to_string(),
        "https://nitter.poast.org".to_string(),
        "https://nitter.privacydev.net".to_string(),
        "https://nitter.l5.ca".to_string(),
    ]
}

fn default_attempt_timeout() -> u64 {
    15
}

fn default_attempt_pace() -> u64 {
    1
}

fn default_bot_token_env() -> String {
    "TG_TOKEN".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval(),
            warmup_secs: default_warmup(),
            posts_per_check: default_posts_per_check(),
            handle_pace_secs: default_handle_pace(),
        }
    }
}

impl Default for MirrorsConfig {
    fn default() -> Self {
        Self {
            urls: default_mirror_urls(),
            attempt_timeout_secs: default_attempt_timeout(),
            attempt_pace_secs: default_attempt_pace(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token_env: default_bot_token_env(),
            default_chat_id: 0,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("POSTER_WATCH")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# poster-watch configuration

[general]
data_dir = "./data"

[watch]
check_interval_secs = 300
warmup_secs = 10
posts_per_check = 20
handle_pace_secs = 1

[mirrors]
urls = [
    "https://nitter.net",
    "https://nitter.poast.org",
    "https://nitter.privacydev.net",
    "https://nitter.l5.ca",
]
attempt_timeout_secs = 15
attempt_pace_secs = 1

[telegram]
bot_token_env = "TG_TOKEN"
# Chat id auto-subscribed at run startup; 0 disables
default_chat_id = 0
"#
        .to_string()
    }
}
