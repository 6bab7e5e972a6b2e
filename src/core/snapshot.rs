//! Snapshot export and import.
//!
//! A snapshot is the full record list as a pretty-printed JSON array, the same
//! schema the store persists. Import validates the whole document before any
//! record is handed back, so a bad file never yields a partial list.

use crate::core::record::PhoneNumberRecord;
use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashSet;

/// Serializes `records` as pretty-printed JSON.
pub fn export_snapshot(records: &[PhoneNumberRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).map_err(Into::into)
}

/// Suggested download name for a snapshot taken on `date`.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("numeros-{}.json", date.format("%Y-%m-%d"))
}

/// Parses and validates snapshot text.
///
/// The top-level value must be an array. Every element must carry non-empty string
/// `id`, `number` and `indicator` fields and a `dateConnected` timestamp, and ids
/// must be distinct.
///
/// # Errors
/// `Error::ImportFormat` describing the first problem found.
pub fn parse_snapshot(text: &str) -> Result<Vec<PhoneNumberRecord>> {
    let value: Value = serde_json::from_str(text).map_err(|e| Error::ImportFormat {
        reason: format!("invalid JSON: {e}"),
    })?;

    let Value::Array(items) = value else {
        return Err(Error::ImportFormat {
            reason: "expected a JSON array of records".to_string(),
        });
    };

    let mut records = Vec::with_capacity(items.len());
    let mut seen_ids = HashSet::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        check_shape(index, &item)?;

        let record: PhoneNumberRecord =
            serde_json::from_value(item).map_err(|e| Error::ImportFormat {
                reason: format!("record {index}: {e}"),
            })?;

        if !seen_ids.insert(record.id.clone()) {
            return Err(Error::ImportFormat {
                reason: format!("record {index}: duplicate id `{}`", record.id),
            });
        }
        records.push(record);
    }

    Ok(records)
}

fn check_shape(index: usize, item: &Value) -> Result<()> {
    let Value::Object(fields) = item else {
        return Err(Error::ImportFormat {
            reason: format!("record {index}: expected an object"),
        });
    };

    for field in ["id", "number", "indicator"] {
        let present = fields
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty());
        if !present {
            return Err(Error::ImportFormat {
                reason: format!("record {index}: missing non-empty `{field}`"),
            });
        }
    }

    if !fields.contains_key("dateConnected") {
        return Err(Error::ImportFormat {
            reason: format!("record {index}: missing `dateConnected`"),
        });
    }

    Ok(())
}
