//! System state entity - Stores named blobs as key-value pairs.
//! The record store persists its whole JSON array under a single key here,
//! the same way a browser keeps it under one local storage key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// System state database model - one row per storage key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_state")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Storage key (e.g., `"phone-numbers-data"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Stored blob, usually serialized JSON
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this key was last written
    pub updated_at: DateTime,
}

/// `SystemState` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
