//! Application configuration loaded from an optional TOML file and
//! environment variables.

use crate::triggers::{FINISH_FILES, KEYWORDS, PEGS_PER_PERSON, WINNERS_COUNT};
use anyhow::{Context, Result};
use peg_store::Settings;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_VAR: &str = "PEG_BOT_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "peg-bot.toml";

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Webex configuration
    pub webex: WebexConfig,

    /// Peg round configuration
    #[serde(default)]
    pub pegs: PegsConfig,

    /// Role name to member person ids
    #[serde(default)]
    pub roles: HashMap<String, StringList>,

    /// Bot configuration
    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebexConfig {
    /// Bot access token
    pub access_token: String,

    /// API base URL
    #[serde(default = "default_webex_url")]
    pub base_url: String,

    /// Bot person id; looked up at startup when unset
    #[serde(default)]
    pub bot_id: Option<String>,

    /// Bot display name as it appears in mentions
    #[serde(default)]
    pub bot_name: Option<String>,

    /// Rooms to poll for messages
    #[serde(default)]
    pub rooms: StringList,

    /// Poll interval for messages
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PegsConfig {
    #[serde(default = "default_pegs_per_person")]
    pub pegs_per_person: i64,

    #[serde(default = "default_winners_count")]
    pub winners_count: i64,

    #[serde(default)]
    pub keywords: StringList,

    /// File URLs attached to the finish announcement
    #[serde(default)]
    pub finish_files: StringList,

    /// JSON snapshot of the ledger; in memory only when unset
    #[serde(default)]
    pub data_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

/// A list given either as an array or as a comma-separated string.
///
/// Environment variables can only carry strings, so `ROLES__ADMIN=a,b`
/// and `admin = ["a", "b"]` both end up here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawList")]
pub struct StringList(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawList {
    List(Vec<String>),
    Joined(String),
}

impl From<RawList> for StringList {
    fn from(raw: RawList) -> Self {
        let items = match raw {
            RawList::List(items) => items,
            RawList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        };

        Self(
            items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        )
    }
}

impl StringList {
    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl Default for PegsConfig {
    fn default() -> Self {
        Self {
            pegs_per_person: default_pegs_per_person(),
            winners_count: default_winners_count(),
            keywords: StringList::default(),
            finish_files: StringList::default(),
            data_path: None,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

// Default value functions
fn default_webex_url() -> String {
    "https://webexapis.com/v1".into()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_pegs_per_person() -> i64 {
    5
}

fn default_winners_count() -> i64 {
    3
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from the config file (if any) and environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

        let builder = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Person and room ids must stay strings.
                    .try_parsing(false),
            );

        Self::build(builder)
    }

    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Copy round limits, lists and role grants into the runtime settings.
    pub fn seed_settings(&self, settings: &Settings) {
        settings.set_config(PEGS_PER_PERSON, self.pegs.pegs_per_person);
        settings.set_config(WINNERS_COUNT, self.pegs.winners_count);
        settings.set_string_config(KEYWORDS, self.pegs.keywords.to_vec());
        settings.set_string_config(FINISH_FILES, self.pegs.finish_files.to_vec());

        for (role, members) in &self.roles {
            for person_id in &members.0 {
                settings.grant_role(person_id.as_str(), role.as_str());
            }
        }
    }
}
