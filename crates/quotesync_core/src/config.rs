//! Runtime configuration loaded from TOML.
//!
//! # Responsibility
//! - Describe the data directory, log level and sync parameters.
//! - Fill unspecified values with defaults.
//!
//! # Invariants
//! - A missing config file yields defaults; an unparsable one is an error.
//! - `QUOTESYNC_ENDPOINT` overrides the configured endpoint when non-empty.

use crate::sync::reconciler::{DEFAULT_BATCH_LIMIT, DEFAULT_SERVER_CATEGORY};
use serde::{Deserialize, Serialize};
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";
pub const ENDPOINT_ENV: &str = "QUOTESYNC_ENDPOINT";
pub const DB_FILE_NAME: &str = "quotesync.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Render(toml::ser::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to access config file: {err}"),
            Self::Parse(err) => write!(f, "invalid config file: {err}"),
            Self::Render(err) => write!(f, "failed to render config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Render(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Render(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub endpoint: String,
    /// Records requested per pull.
    pub batch_limit: u32,
    pub interval_secs: u64,
    /// Per-request bound; expiry counts as a pull failure.
    pub timeout_secs: u64,
    /// Category assigned to quotes mapped from remote records.
    pub server_category: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            batch_limit: DEFAULT_BATCH_LIMIT,
            interval_secs: 30,
            timeout_secs: 10,
            server_category: DEFAULT_SERVER_CATEGORY.to_string(),
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub sync: SyncConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".quotesync"),
            log_level: crate::logging::default_log_level().to_string(),
            sync: SyncConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = match fs::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(err.into()),
        };

        if let Ok(value) = env::var(ENDPOINT_ENV) {
            if !value.trim().is_empty() {
                config.sync.endpoint = value.trim().to_string();
            }
        }

        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}
