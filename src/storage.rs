//! Key-value blob storage backing the record store.
//!
//! The store keeps its entire record list as one serialized blob under one key.
//! [`MemoryStorage`] holds blobs in a shared map; [`DatabaseStorage`] keeps them in
//! the `system_state` table through `SeaORM`.

use crate::entities::{SystemState, system_state};
use crate::errors::{Error, Result};
use sea_orm::{DatabaseConnection, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

/// Reads and writes whole blobs by key.
#[allow(async_fn_in_trait)]
pub trait BlobStorage {
    /// Returns the blob stored under `key`, or `None` if nothing was ever written.
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the blob stored under `key`.
    async fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.blobs.lock().map_err(|_| Error::Storage {
            message: "Failed to acquire memory storage lock".to_string(),
        })
    }
}

impl BlobStorage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage in the `system_state` table.
#[derive(Debug, Clone)]
pub struct DatabaseStorage {
    db: DatabaseConnection,
}

impl DatabaseStorage {
    /// Wraps a connection whose tables were created with
    /// [`crate::config::database::create_tables`].
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl BlobStorage for DatabaseStorage {
    #[instrument(skip(self))]
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let row = SystemState::find()
            .filter(system_state::Column::Key.eq(key))
            .one(&self.db)
            .await?;
        debug!("Read key '{}': {}", key, if row.is_some() { "found" } else { "absent" });
        Ok(row.map(|model| model.value))
    }

    #[instrument(skip(self, value))]
    async fn write(&self, key: &str, value: &str) -> Result<()> {
        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().naive_utc();

        let existing = SystemState::find()
            .filter(system_state::Column::Key.eq(key))
            .one(&txn)
            .await?;

        match existing {
            Some(model) => {
                let mut active: system_state::ActiveModel = model.into();
                active.value = Set(value.to_string());
                active.updated_at = Set(now);
                active.update(&txn).await?;
            }
            None => {
                system_state::ActiveModel {
                    key: Set(key.to_string()),
                    value: Set(value.to_string()),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
        }

        txn.commit().await?;
        debug!("Wrote {} bytes under key '{}'", value.len(), key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{init_test_tracing, setup_test_db};

    #[tokio::test]
    async fn test_memory_storage_set_and_get() -> Result<()> {
        let storage = MemoryStorage::new();
        assert!(storage.read("k").await?.is_none());

        storage.write("k", "v1").await?;
        storage.write("k", "v2").await?;
        assert_eq!(storage.read("k").await?, Some("v2".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_storage_clones_share_state() -> Result<()> {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.write("k", "shared").await?;
        assert_eq!(other.read("k").await?, Some("shared".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_database_storage_get_non_existent_key() -> Result<()> {
        init_test_tracing();
        let storage = DatabaseStorage::new(setup_test_db().await?);
        assert!(storage.read("this_key_does_not_exist").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_database_storage_updates_existing_key() -> Result<()> {
        init_test_tracing();
        let storage = DatabaseStorage::new(setup_test_db().await?);

        storage.write("numbers", "[]").await?;
        assert_eq!(storage.read("numbers").await?, Some("[]".to_string()));

        storage.write("numbers", "[1]").await?;
        assert_eq!(storage.read("numbers").await?, Some("[1]".to_string()));

        let rows = SystemState::find().all(storage.connection()).await?;
        assert_eq!(rows.len(), 1, "upsert must not duplicate the key");
        Ok(())
    }

    #[tokio::test]
    async fn test_database_storage_keys_are_independent() -> Result<()> {
        let storage = DatabaseStorage::new(setup_test_db().await?);
        storage.write("a", "first").await?;
        storage.write("b", "second").await?;
        assert_eq!(storage.read("a").await?, Some("first".to_string()));
        assert_eq!(storage.read("b").await?, Some("second".to_string()));
        Ok(())
    }
}
