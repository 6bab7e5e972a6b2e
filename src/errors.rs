//! Unified error type for the record store, its storage backends and configuration.

use thiserror::Error;

/// Every failure the crate can surface to a caller.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field was blank on add, update or bulk parse.
    #[error("Validation error: `{field}` must not be empty")]
    Validation {
        /// Name of the offending field
        field: &'static str,
    },

    /// Snapshot text could not be parsed or did not match the record schema.
    #[error("Import format error: {reason}")]
    ImportFormat {
        /// Human-readable description of the first problem found
        reason: String,
    },

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Details of the configuration failure
        message: String,
    },

    /// Storage backend could not be accessed.
    #[error("Storage error: {message}")]
    Storage {
        /// Details of the storage failure
        message: String,
    },

    /// Database error from `SeaORM`.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON encoding failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
