/// Application settings loaded from config.toml
pub mod app;

/// Database configuration and connection management
pub mod database;

pub use app::{AppConfig, load_config, load_config_or_default, load_default_config};
