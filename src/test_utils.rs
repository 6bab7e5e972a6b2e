//! Shared test utilities for `lead-tracker`.
//!
//! Helpers for building stores over in-memory or `SQLite` storage and for creating
//! records with fixed timestamps.

use crate::{
    config::{app::DEFAULT_STORAGE_KEY, database::create_tables},
    core::{PhoneNumberRecord, RecordStore, record::parse_timestamp},
    errors::{Error, Result},
    storage::{DatabaseStorage, MemoryStorage},
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber; safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    create_tables(&db).await?;
    Ok(db)
}

/// An empty store over fresh in-memory storage.
pub async fn memory_store() -> Result<RecordStore<MemoryStorage>> {
    RecordStore::load(MemoryStorage::new(), DEFAULT_STORAGE_KEY).await
}

/// An empty store over a fresh in-memory `SQLite` database.
pub async fn database_store() -> Result<RecordStore<DatabaseStorage>> {
    let db = setup_test_db().await?;
    RecordStore::load(DatabaseStorage::new(db), DEFAULT_STORAGE_KEY).await
}

/// Parses an RFC 3339 literal. Panics on malformed input, which is a bug in the test.
#[allow(clippy::panic)]
pub fn at(raw: &str) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(|| panic!("bad test timestamp {raw}"))
}

/// A record connected at `date_connected` with a random id.
///
/// # Defaults
/// * `is_scammer`: false
/// * `notes`, `last_reset`: None
pub fn record_at(
    number: &str,
    indicator: &str,
    date_connected: DateTime<Utc>,
) -> PhoneNumberRecord {
    PhoneNumberRecord {
        id: uuid::Uuid::new_v4().to_string(),
        number: number.to_string(),
        indicator: indicator.to_string(),
        date_connected,
        is_scammer: false,
        notes: None,
        last_reset: None,
    }
}

/// Wraps a message as a storage error, for fake backends.
pub fn storage_error(message: &str) -> Error {
    Error::Storage {
        message: message.to_string(),
    }
}
