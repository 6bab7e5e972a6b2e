//! Application configuration loading from config.toml
//!
//! Every field has a default, so an empty or missing config file yields a
//! working setup: records stored under `phone-numbers-data` in the default
//! `SQLite` database, with cards flagged after 15 days.

use crate::core::record::DEFAULT_ALERT_THRESHOLD_DAYS;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Storage key the record list is persisted under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "phone-numbers-data";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Key the JSON record list is stored under
    pub storage_key: String,
    /// Days connected after which a record counts as overdue
    pub alert_threshold_days: i64,
    /// Database URL; `DATABASE_URL` in the environment overrides it
    pub database_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            alert_threshold_days: DEFAULT_ALERT_THRESHOLD_DAYS,
            database_url: None,
        }
    }
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns `Error::Config` if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads configuration from `path`, falling back to defaults when the file does not exist.
///
/// A file that exists but fails to parse is still an error.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        info!(
            "No config file at {}, using defaults.",
            path_ref.display()
        );
        return Ok(AppConfig::default());
    }
    load_config(path_ref)
}

/// Loads configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<AppConfig> {
    load_config_or_default("config.toml")
}
