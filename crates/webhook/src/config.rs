//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use conversation::{CancelPolicy, HandlerConfig, LocaleKind, OrderingPolicy, StorageBackend};
use telegram_api::{DEFAULT_API_URL, DEFAULT_OFFSET_FILE};

/// How updates reach the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotMode {
    /// Telegram posts updates to `/webhook`.
    Webhook,
    /// The bot long-polls `getUpdates`; for local development.
    Poll,
}

/// Bot process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    pub mode: BotMode,
    /// Bot API token.
    pub token: String,
    /// Bot API base URL.
    pub api_url: String,
    pub storage: StorageBackend,
    /// Where polling mode keeps its `getUpdates` offset.
    pub offset_file: PathBuf,
    pub handler: HandlerConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `TELEGRAM_API_TOKEN` | Bot API token | (required) |
    /// | `TELEGRAM_API_URL` | Bot API base URL | `https://api.telegram.org` |
    /// | `WEBHOOK_ADDR` | Server bind address | `127.0.0.1:8443` |
    /// | `BOT_MODE` | `webhook` or `poll` | `webhook` |
    /// | `STORAGE_BACKEND` | `file` or `sqlite` | `file` |
    /// | `TELEGRAM_BOT_STORAGE` | Sequencer file | `storage.json` |
    /// | `TELEGRAM_BOT_CONTEXT_STORAGE` | Context file | `context.json` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:bot.db?mode=rwc` |
    /// | `UPDATE_OFFSET_FILE` | Poll offset file | `update_offset.json` |
    /// | `STRICT_UPDATE_ORDER` | Reject already seen update ids | `false` |
    /// | `CALENDAR_LOCALE` | `he` or `en` | `he` |
    /// | `CANCEL_POLICY` | `retain` or `clear` | `retain` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let addr = var("WEBHOOK_ADDR", "127.0.0.1:8443")
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let mode = match var("BOT_MODE", "webhook").trim().to_lowercase().as_str() {
            "webhook" => BotMode::Webhook,
            "poll" | "polling" => BotMode::Poll,
            other => return Err(ConfigError::Invalid("BOT_MODE", other.to_string())),
        };

        let token = lookup("TELEGRAM_API_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let storage = match var("STORAGE_BACKEND", "file").trim().to_lowercase().as_str() {
            "file" => StorageBackend::File {
                state_path: PathBuf::from(var("TELEGRAM_BOT_STORAGE", "storage.json")),
                context_path: PathBuf::from(var("TELEGRAM_BOT_CONTEXT_STORAGE", "context.json")),
            },
            "sqlite" => StorageBackend::Sqlite {
                url: var("SQLITE_PATH", "sqlite:bot.db?mode=rwc"),
            },
            other => return Err(ConfigError::Invalid("STORAGE_BACKEND", other.to_string())),
        };

        let ordering = var("STRICT_UPDATE_ORDER", "false")
            .parse::<OrderingPolicy>()
            .map_err(|e| ConfigError::Invalid("STRICT_UPDATE_ORDER", e))?;
        let locale = var("CALENDAR_LOCALE", "he")
            .parse::<LocaleKind>()
            .map_err(|e| ConfigError::Invalid("CALENDAR_LOCALE", e))?;
        let cancel_policy = var("CANCEL_POLICY", "retain")
            .parse::<CancelPolicy>()
            .map_err(|e| ConfigError::Invalid("CANCEL_POLICY", e))?;

        Ok(Self {
            addr,
            mode,
            token,
            api_url: var("TELEGRAM_API_URL", DEFAULT_API_URL),
            storage,
            offset_file: PathBuf::from(var("UPDATE_OFFSET_FILE", DEFAULT_OFFSET_FILE)),
            handler: HandlerConfig {
                ordering,
                cancel_policy,
                locale,
            },
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid WEBHOOK_ADDR format")]
    InvalidAddr,

    #[error("TELEGRAM_API_TOKEN environment variable is required")]
    MissingToken,

    #[error("Invalid {0}: {1}")]
    Invalid(&'static str, String),
}
