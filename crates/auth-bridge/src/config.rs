//! Bridge configuration loaded from environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Bridge configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Chat gateway configuration
    pub chat: ChatConfig,

    /// Handshake lifetime configuration
    #[serde(default)]
    pub handshake: HandshakeConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Chat platform REST gateway URL
    #[serde(default = "default_chat_api_url")]
    pub api_url: String,

    /// Bot token
    pub bot_token: String,

    /// Channel where prompts are posted and confirmations are read
    pub channel_id: String,

    /// Poll interval for inbound messages
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// How many recent messages to scan for a prompt when a confirmation
    /// is not a threaded reply
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HandshakeConfig {
    /// Validity window of a login attempt
    #[serde(default = "default_ttl", with = "humantime_serde")]
    pub ttl: Duration,

    /// How often abandoned attempts are swept
    #[serde(default = "default_sweep_interval", with = "humantime_serde")]
    pub sweep_interval: Duration,

    /// Comma separated words accepted as a confirmation
    #[serde(default = "default_affirmative")]
    pub affirmative: String,
}

impl HandshakeConfig {
    /// Affirmative words, trimmed and lowercased.
    pub fn affirmative_words(&self) -> Vec<String> {
        self.affirmative
            .split(',')
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per minute across all clients
    #[serde(default = "default_per_minute")]
    pub per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default implementations
impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            sweep_interval: default_sweep_interval(),
            affirmative: default_affirmative(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_minute: default_per_minute(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_chat_api_url() -> String {
    "http://chat-gateway:8080".into()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_history_limit() -> usize {
    50
}

fn default_ttl() -> Duration {
    handshake_store::DEFAULT_TTL
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_affirmative() -> String {
    "sim,yes".into()
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3011
}

fn default_per_minute() -> u32 {
    120
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Keys use `__` between section and field, e.g. `CHAT__BOT_TOKEN`.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_env(config::Environment::default())
    }

    fn from_env(source: config::Environment) -> Result<Self> {
        // Channel and user ids are numeric strings; keep them as strings.
        let config = config::Config::builder()
            .add_source(source.separator("__").try_parsing(false))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
