//! Configuration module for the feed relay.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::feed::validate_url;
use crate::source::{default_sources, FeedSource, SourceKind};
use crate::store::records::PIN_KEY_SUFFIX;
use crate::{RelayError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret expected in the `secret` header of polling requests.
    /// Empty disables the check.
    #[serde(default)]
    pub secret: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            secret: String::new(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Namespace prefix for dedup records.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_db_path() -> String {
    "data/relay.db".to_string()
}

fn default_namespace() -> String {
    "relay".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            namespace: default_namespace(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/relay.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Telegram Bot API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather.
    #[serde(default)]
    pub bot_token: String,
    /// Destination channel chat ID.
    #[serde(default)]
    pub channel: i64,
    /// Bot API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel: 0,
            api_base: default_api_base(),
        }
    }
}

/// Upstream fetch configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// User agent sent upstream.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// GitHub REST API base URL.
    #[serde(default = "default_github_api_base")]
    pub github_api_base: String,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    20
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_user_agent() -> String {
    "feed-relay/0.1".to_string()
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
            max_feed_size_bytes: default_max_feed_size(),
            user_agent: default_user_agent(),
            github_api_base: default_github_api_base(),
        }
    }
}

/// Built-in poll trigger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the in-process scheduler runs.
    #[serde(default = "default_scheduler_enabled")]
    pub enabled: bool,
    /// Seconds between poll cycles, at most 60 so every minute gets a tick.
    #[serde(default = "default_scheduler_interval")]
    pub interval_secs: u64,
}

/// Longest scheduler interval that still ticks once per minute.
pub const MAX_SCHEDULER_INTERVAL_SECS: u64 = 60;

fn default_scheduler_enabled() -> bool {
    true
}

fn default_scheduler_interval() -> u64 {
    60
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_scheduler_enabled(),
            interval_secs: default_scheduler_interval(),
        }
    }
}

/// Instant View rule hashes by hostname.
fn default_instant_view() -> HashMap<String, String> {
    [
        ("deno.news", "b5ba1c523db473"),
        ("deno.com", "28aee3eda1037a"),
        ("devblogs.microsoft.com", "24952bb2da22c6"),
        ("v8.dev", "8320f1ac30d205"),
        ("bun.sh", "631ee27991e51a"),
    ]
    .into_iter()
    .map(|(host, hash)| (host.to_string(), hash.to_string()))
    .collect()
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Telegram configuration.
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Fetch configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Scheduler configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Instant View hashes.
    #[serde(default = "default_instant_view")]
    pub instant_view: HashMap<String, String>,
    /// Polled sources, in round-robin order.
    #[serde(default = "default_sources")]
    pub sources: Vec<FeedSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            telegram: TelegramConfig::default(),
            fetch: FetchConfig::default(),
            scheduler: SchedulerConfig::default(),
            instant_view: default_instant_view(),
            sources: default_sources(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(RelayError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RelayError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `RELAY_BOT_TOKEN`: Telegram bot token
    /// - `RELAY_CHANNEL`: destination chat ID
    /// - `RELAY_SECRET`: shared secret for polling endpoints
    pub fn apply_env_overrides(&mut self) {
        if let Some(token) = non_empty_env("RELAY_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Some(channel) = non_empty_env("RELAY_CHANNEL") {
            match channel.parse() {
                Ok(id) => self.telegram.channel = id,
                Err(_) => tracing::warn!("Ignoring RELAY_CHANNEL: not a chat ID: {}", channel),
            }
        }
        if let Some(secret) = non_empty_env("RELAY_SECRET") {
            self.server.secret = secret;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.is_empty() {
            return Err(RelayError::Config(
                "telegram.bot_token is not set. \
                 Set it in config.toml or via RELAY_BOT_TOKEN environment variable."
                    .to_string(),
            ));
        }
        if self.telegram.channel == 0 {
            return Err(RelayError::Config(
                "telegram.channel should be a chat (channel) ID".to_string(),
            ));
        }
        if self.scheduler.interval_secs == 0 {
            return Err(RelayError::Config(
                "scheduler.interval_secs must be positive".to_string(),
            ));
        }
        // Sources are picked by minute of the hour; a slower tick skips minutes
        if self.scheduler.interval_secs > MAX_SCHEDULER_INTERVAL_SECS {
            return Err(RelayError::Config(format!(
                "scheduler.interval_secs must be at most {MAX_SCHEDULER_INTERVAL_SECS}, got {}",
                self.scheduler.interval_secs
            )));
        }
        if self.sources.is_empty() {
            return Err(RelayError::Config("no sources configured".to_string()));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.key.is_empty() {
                return Err(RelayError::Config("source key must not be empty".to_string()));
            }
            if source.key.ends_with(PIN_KEY_SUFFIX) {
                return Err(RelayError::Config(format!(
                    "source key '{}' must not end with '{PIN_KEY_SUFFIX}'",
                    source.key
                )));
            }
            if !seen.insert(source.key.as_str()) {
                return Err(RelayError::Config(format!(
                    "duplicate source key: {}",
                    source.key
                )));
            }
            match &source.kind {
                SourceKind::Feed { url, .. } => {
                    validate_url(url).map_err(|e| {
                        RelayError::Config(format!("source '{}': {}", source.key, e))
                    })?;
                }
                SourceKind::Release { repo, .. } => {
                    if !is_repo_slug(repo) {
                        return Err(RelayError::Config(format!(
                            "source '{}': repo must be owner/name, got '{}'",
                            source.key, repo
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn is_repo_slug(repo: &str) -> bool {
    let mut parts = repo.split('/');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
    )
}
