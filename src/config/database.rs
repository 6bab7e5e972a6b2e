//! Database configuration module for `lead-tracker`.
//!
//! Handles the `SQLite` connection and creation of the key-value table that backs
//! [`crate::storage::DatabaseStorage`]. The table is generated from the entity
//! definition with `Schema::create_table_from_entity`, so the schema always
//! matches the Rust struct.

use crate::config::app::AppConfig;
use crate::entities::SystemState;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info};

/// Fallback database location when neither the environment nor config names one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/lead_tracker.sqlite?mode=rwc";

/// Resolves the database URL.
///
/// `DATABASE_URL` from the environment wins, then `database_url` from the config file,
/// then [`DEFAULT_DATABASE_URL`].
#[must_use]
pub fn get_database_url(config: &AppConfig) -> String {
    std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| config.database_url.clone())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Creates the parent directory of a file-backed `SQLite` URL, since `SQLite` will not.
pub fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let file = rest.split('?').next().unwrap_or_default();
    match Path::new(file).parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {database_url}");
    ensure_sqlite_dir(database_url)?;
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the `system_state` table if it does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut system_state_table = schema.create_table_from_entity(SystemState);
    system_state_table.if_not_exists();

    db.execute(builder.build(&system_state_table)).await?;
    info!("Database tables ensured.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SystemStateModel;
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let rows: Vec<SystemStateModel> = SystemState::find().limit(1).all(&db).await?;
        assert!(rows.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_ensure_sqlite_dir_ignores_memory_urls() -> Result<()> {
        ensure_sqlite_dir("sqlite::memory:")?;
        ensure_sqlite_dir("sqlite://plain.sqlite?mode=rwc")?;
        Ok(())
    }

    #[test]
    fn test_ensure_sqlite_dir_creates_parent() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("lead-tracker-{}", uuid::Uuid::new_v4()));
        let url = format!("sqlite://{}/nested/db.sqlite?mode=rwc", dir.display());

        ensure_sqlite_dir(&url)?;
        assert!(dir.join("nested").is_dir());

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_get_database_url_prefers_config_over_default() {
        // Only meaningful when DATABASE_URL is not exported in the test environment
        if std::env::var("DATABASE_URL").is_ok() {
            return;
        }
        let config = AppConfig {
            database_url: Some("sqlite::memory:".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(get_database_url(&config), "sqlite::memory:");
        assert_eq!(get_database_url(&AppConfig::default()), DEFAULT_DATABASE_URL);
    }
}
