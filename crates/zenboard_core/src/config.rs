//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve the database path and logging settings for adapters.
//!
//! # Invariants
//! - Blank environment values count as unset.
//! - Resolution never touches the filesystem.

use crate::logging::{default_log_level, normalize_level, LoggingError};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "ZENBOARD_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "ZENBOARD_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "ZENBOARD_LOG_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "zenboard.db";

/// Resolved settings for opening the note store and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZenboardConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging stays off when this is `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for ZenboardConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl ZenboardConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggingError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(LOG_LEVEL_ENV) {
            config.log_level = normalize_level(&level)?;
        }
        config.log_dir = read(LOG_DIR_ENV).map(PathBuf::from);

        Ok(config)
    }
}
