use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use mc_bot_proto::types::{GameProfile, Uuid};

#[derive(Debug, Default, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub account: AccountSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub ticker: TickerSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct AccountSection {
    #[serde(default = "default_username")]
    pub username: String,
    /// Account UUID. Offline-mode UUID of `username` when absent.
    #[serde(default)]
    pub uuid: Option<Uuid>,
}

fn default_username() -> String {
    "Bot".into()
}

impl Default for AccountSection {
    fn default() -> Self {
        Self {
            username: default_username(),
            uuid: None,
        }
    }
}

impl AccountSection {
    pub fn profile(&self) -> GameProfile {
        match self.uuid {
            Some(id) => GameProfile::new(id, self.username.clone()),
            None => GameProfile::offline(self.username.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_address")]
    pub address: String,
}

fn default_address() -> String {
    "localhost:25565".into()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TickerSection {
    /// Position report period in milliseconds. Default: 50 (one game tick).
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_interval_ms() -> u64 {
    50
}

impl Default for TickerSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl TickerSection {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl BotConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Like [`BotConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
