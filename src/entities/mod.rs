//! Entity module - Contains the SeaORM entity definitions for the database.
//! The store only needs a key-value table; records themselves live inside
//! the JSON blob stored under one key.

pub mod system_state;

pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
