//! Phone-number records and the inputs that create or patch them.
//!
//! A record is serialized with the same field names and timestamp shape a browser
//! produces with `JSON.stringify`, so snapshots move freely between the two.

use crate::errors::{Error, Result};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Days connected after which a record is flagged as overdue by default.
pub const DEFAULT_ALERT_THRESHOLD_DAYS: i64 = 15;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// A tracked phone number together with who referred it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberRecord {
    /// Opaque unique id, assigned at creation and never changed
    pub id: String,
    /// Raw number text as entered
    pub number: String,
    /// Name or number of whoever referred this number
    pub indicator: String,
    /// When the number was connected, or last reset
    #[serde(with = "iso_millis")]
    pub date_connected: DateTime<Utc>,
    /// Manually set fraud flag
    #[serde(default)]
    pub is_scammer: bool,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Set only by a reset
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "iso_millis::option"
    )]
    pub last_reset: Option<DateTime<Utc>>,
}

impl PhoneNumberRecord {
    /// Builds a fresh record from a validated entry.
    pub(crate) fn from_entry(entry: NewEntry, date_connected: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            number: entry.number,
            indicator: entry.indicator,
            date_connected,
            is_scammer: false,
            notes: normalize_notes(entry.notes),
            last_reset: None,
        }
    }

    /// Instant the days-connected counter runs from.
    #[must_use]
    pub fn reference_date(&self) -> DateTime<Utc> {
        self.last_reset.unwrap_or(self.date_connected)
    }

    /// Whole days between `now` and the reference date.
    ///
    /// The difference is absolute: a reference date in the future still yields a
    /// positive count.
    #[must_use]
    pub fn days_since_at(&self, now: DateTime<Utc>) -> i64 {
        (now - self.reference_date()).num_milliseconds().abs() / MILLIS_PER_DAY
    }

    /// [`Self::days_since_at`] measured from the current time.
    #[must_use]
    pub fn days_since(&self) -> i64 {
        self.days_since_at(Utc::now())
    }

    /// Whether the record has been connected for at least `threshold_days`.
    #[must_use]
    pub fn is_overdue_at(&self, now: DateTime<Utc>, threshold_days: i64) -> bool {
        self.days_since_at(now) >= threshold_days
    }
}

/// Input for adding a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    /// Raw number text
    pub number: String,
    /// Referrer
    pub indicator: String,
    /// Optional notes; empty notes are dropped
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewEntry {
    /// Creates an entry without notes.
    pub fn new(number: impl Into<String>, indicator: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            indicator: indicator.into(),
            notes: None,
        }
    }

    /// Attaches notes to the entry.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Rejects entries with a blank number or indicator.
    pub fn validate(&self) -> Result<()> {
        require("number", &self.number)?;
        require("indicator", &self.indicator)
    }
}

/// Partial update for a record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    /// New number text
    pub number: Option<String>,
    /// New referrer
    pub indicator: Option<String>,
    /// `Some(None)` clears the notes
    pub notes: Option<Option<String>>,
    /// New fraud flag
    pub is_scammer: Option<bool>,
    /// New connection date
    pub date_connected: Option<DateTime<Utc>>,
    /// `Some(None)` clears the last reset
    pub last_reset: Option<Option<DateTime<Utc>>>,
}

impl RecordUpdate {
    /// The patch an edit form submits: number, indicator and notes together.
    pub fn details(
        number: impl Into<String>,
        indicator: impl Into<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            number: Some(number.into()),
            indicator: Some(indicator.into()),
            notes: Some(notes),
            ..Self::default()
        }
    }

    /// Rejects patches that would blank out a required field.
    pub fn validate(&self) -> Result<()> {
        if let Some(number) = &self.number {
            require("number", number)?;
        }
        if let Some(indicator) = &self.indicator {
            require("indicator", indicator)?;
        }
        Ok(())
    }

    pub(crate) fn apply_to(self, record: &mut PhoneNumberRecord) {
        if let Some(number) = self.number {
            record.number = number;
        }
        if let Some(indicator) = self.indicator {
            record.indicator = indicator;
        }
        if let Some(notes) = self.notes {
            record.notes = normalize_notes(notes);
        }
        if let Some(is_scammer) = self.is_scammer {
            record.is_scammer = is_scammer;
        }
        if let Some(date_connected) = self.date_connected {
            record.date_connected = date_connected;
        }
        if let Some(last_reset) = self.last_reset {
            record.last_reset = last_reset;
        }
    }
}

/// Splits pasted text into one entry per non-blank line, all credited to `indicator`.
///
/// Lines are trimmed; blank lines are skipped.
///
/// # Errors
/// `Error::Validation` when the indicator is blank or no line holds a number.
pub fn parse_bulk_entries(text: &str, indicator: &str) -> Result<Vec<NewEntry>> {
    require("indicator", indicator)?;

    let entries: Vec<NewEntry> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|number| NewEntry::new(number, indicator))
        .collect();

    if entries.is_empty() {
        return Err(Error::Validation { field: "numbers" });
    }
    Ok(entries)
}

/// Current time at the millisecond precision records are stored with.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Parses an RFC 3339 timestamp, truncated to milliseconds.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc).trunc_subsecs(3))
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation { field });
    }
    Ok(())
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|n| !n.is_empty())
}

/// `YYYY-MM-DDTHH:MM:SS.sssZ` timestamps, the shape `Date.toISOString()` emits.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp `{raw}`")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer, de};

        #[allow(clippy::ref_option)] // signature dictated by serde's `with`
        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            match value {
                Some(timestamp) => super::serialize(timestamp, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| {
                    super::super::parse_timestamp(&raw)
                        .ok_or_else(|| de::Error::custom(format!("invalid timestamp `{raw}`")))
                })
                .transpose()
        }
    }
}
