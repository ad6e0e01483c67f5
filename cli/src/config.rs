//! Runtime configuration module.
//!
//! Handles loading configuration from environment variables.

use crate::db::DatabaseConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Runtime configuration.
///
/// Configuration values are read from environment variables:
/// - `HUE_CONF_DIR`: Hue configuration directory (required)
/// - `HUE_DATABASE_*`: database settings, see [`DatabaseConfig::from_env`]
#[derive(Debug, Clone)]
pub struct Config {
    /// Hue configuration directory.
    pub hue_conf_dir: PathBuf,
    /// Database settings.
    pub database: DatabaseConfig,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `HUE_CONF_DIR` is not set
    /// - `HUE_DATABASE_PORT` is set but cannot be parsed as a valid port number
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a configuration through a variable lookup function.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let hue_conf_dir = lookup("HUE_CONF_DIR")
            .map(PathBuf::from)
            .context("HUE_CONF_DIR environment variable is not set")?;
        let database = DatabaseConfig::from_lookup(lookup)?;

        Ok(Self {
            hue_conf_dir,
            database,
        })
    }
}
