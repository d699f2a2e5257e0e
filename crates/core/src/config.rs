use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::record::PaymentMode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Process-wide configuration, loaded once at startup and passed explicitly
/// to the components that need it. Never read from ambient global state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("khata.db")
}

/// Matching parameters for statement reconciliation.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileConfig {
    /// Maximum absolute amount difference, inclusive, in cents.
    #[serde(default = "default_tolerance_cents")]
    pub tolerance_cents: i64,
    /// Ledger payment-mode tag for the statement's source account.
    #[serde(default = "default_bank_channel")]
    pub bank_channel: PaymentMode,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        ReconcileConfig {
            tolerance_cents: default_tolerance_cents(),
            bank_channel: default_bank_channel(),
        }
    }
}

fn default_tolerance_cents() -> i64 {
    1
}

fn default_bank_channel() -> PaymentMode {
    PaymentMode::Icici090
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

impl Config {
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(raw)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    /// Missing config file is not an error; defaults apply.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            let mut config = Config::default();
            config.apply_env();
            Ok(config)
        }
    }

    /// The bot token is a secret; allow the environment to override the file.
    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            if let Some(telegram) = &mut self.telegram {
                telegram.bot_token = token;
            }
        }
    }
}
