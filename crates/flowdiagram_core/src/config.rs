//! Store and logging configuration loaded from the environment.
//!
//! Recognized variables (a `.env` file is honored when present):
//! - `FLOWDIAGRAM_DB_PATH`: SQLite file path; unset or `:memory:` selects
//!   an in-memory store.
//! - `FLOWDIAGRAM_LOG_LEVEL`: `trace|debug|info|warn|error`; defaults by
//!   build mode.
//! - `FLOWDIAGRAM_LOG_DIR`: absolute directory for rolling logs; logging
//!   stays off when unset.

use crate::logging::{default_log_level, init_logging, normalize_level};
use once_cell::sync::Lazy;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "FLOWDIAGRAM_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "FLOWDIAGRAM_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "FLOWDIAGRAM_LOG_DIR";

const IN_MEMORY_PATH: &str = ":memory:";

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    // A missing .env file is the normal case.
    let _ = dotenvy::dotenv();
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, message: String },
    Logging(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, message } => write!(f, "invalid {key}: {message}"),
            Self::Logging(message) => write!(f, "logging init failed: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// `None` selects an in-memory store.
    pub db_path: Option<PathBuf>,
    pub log_level: &'static str,
    pub log_dir: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Reads configuration from the process environment and `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = non_blank(lookup(DB_PATH_VAR))
            .filter(|path| path != IN_MEMORY_PATH)
            .map(PathBuf::from);

        let log_level = match non_blank(lookup(LOG_LEVEL_VAR)) {
            Some(value) => normalize_level(&value).map_err(|message| {
                ConfigError::InvalidValue {
                    key: LOG_LEVEL_VAR,
                    message,
                }
            })?,
            None => default_log_level(),
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir: non_blank(lookup(LOG_DIR_VAR)),
        })
    }

    /// Starts logging when a log directory is configured.
    ///
    /// Returns whether logging is active after the call.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        match self.log_dir.as_deref() {
            Some(log_dir) => {
                init_logging(self.log_level, log_dir).map_err(ConfigError::Logging)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
