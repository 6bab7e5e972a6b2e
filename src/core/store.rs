//! Record store - owns the phone-number list and mirrors it to storage.
//!
//! The list is hydrated once by [`RecordStore::load`]. Every mutation builds the new
//! list, persists it in full and only then swaps it in, so memory and storage never
//! disagree after a failed write.

use crate::{
    core::{
        filter::{FilterOptions, filter_records},
        record::{self, NewEntry, PhoneNumberRecord, RecordUpdate},
        report::{IndicatorReport, generate_indicator_report},
        snapshot,
        stats::{NumberStats, compute_stats},
    },
    errors::{Error, Result},
    storage::BlobStorage,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// The phone-number list together with the storage it is mirrored to.
#[derive(Debug)]
pub struct RecordStore<S> {
    storage: S,
    key: String,
    records: Vec<PhoneNumberRecord>,
}

impl<S: BlobStorage> RecordStore<S> {
    /// Hydrates a store from the blob under `key`.
    ///
    /// A missing or unparsable blob yields an empty store; the corrupt data is logged
    /// and discarded. Errors reaching the backend itself are returned.
    pub async fn load(storage: S, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let records = match storage.read(&key).await? {
            None => {
                info!("No stored records under '{key}', starting empty.");
                Vec::new()
            }
            Some(blob) => match serde_json::from_str::<Vec<PhoneNumberRecord>>(&blob) {
                Ok(records) => {
                    info!("Loaded {} records from '{key}'.", records.len());
                    records
                }
                Err(e) => {
                    warn!("Discarding unreadable data under '{key}': {e}");
                    Vec::new()
                }
            },
        };

        Ok(Self {
            storage,
            key,
            records,
        })
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[PhoneNumberRecord] {
        &self.records
    }

    /// Looks up a record by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PhoneNumberRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Storage the store persists to.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Adds one number, connected now.
    ///
    /// # Errors
    /// `Error::Validation` for a blank number or indicator; the store is untouched.
    pub async fn add_single(&mut self, entry: NewEntry) -> Result<PhoneNumberRecord> {
        entry.validate()?;
        let record = PhoneNumberRecord::from_entry(entry, record::now());

        let mut next = self.records.clone();
        next.push(record.clone());
        self.commit(next).await?;

        debug!("Added record {} for indicator '{}'", record.id, record.indicator);
        Ok(record)
    }

    /// Adds several numbers sharing one connection timestamp, in input order.
    ///
    /// Nothing is added if any entry is invalid.
    pub async fn add_bulk(&mut self, entries: Vec<NewEntry>) -> Result<Vec<PhoneNumberRecord>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        entries.iter().try_for_each(NewEntry::validate)?;

        let connected = record::now();
        let added: Vec<PhoneNumberRecord> = entries
            .into_iter()
            .map(|entry| PhoneNumberRecord::from_entry(entry, connected))
            .collect();

        let mut next = self.records.clone();
        next.extend(added.iter().cloned());
        self.commit(next).await?;

        info!("Added {} records in bulk.", added.len());
        Ok(added)
    }

    /// Merges `update` into the record with `id`.
    ///
    /// Returns the updated record, or `None` when no record has that id; in that case
    /// nothing is written.
    ///
    /// # Errors
    /// `Error::Validation` when the patch blanks out the number or indicator.
    pub async fn update(
        &mut self,
        id: &str,
        update: RecordUpdate,
    ) -> Result<Option<PhoneNumberRecord>> {
        update.validate()?;
        let Some(position) = self.position(id) else {
            debug!("Update skipped, no record with id {id}");
            return Ok(None);
        };

        let mut next = self.records.clone();
        update.apply_to(&mut next[position]);
        let updated = next[position].clone();
        self.commit(next).await?;

        debug!("Updated record {id}");
        Ok(Some(updated))
    }

    /// Flips the scammer flag.
    pub async fn toggle_scammer(&mut self, id: &str) -> Result<Option<PhoneNumberRecord>> {
        let Some(current) = self.get(id).map(|record| record.is_scammer) else {
            return Ok(None);
        };
        self.update(
            id,
            RecordUpdate {
                is_scammer: Some(!current),
                ..RecordUpdate::default()
            },
        )
        .await
    }

    /// Restarts the days-connected counter by moving both the last reset and the
    /// connection date to now.
    pub async fn reset_days(&mut self, id: &str) -> Result<Option<PhoneNumberRecord>> {
        let now = record::now();
        self.update(
            id,
            RecordUpdate {
                date_connected: Some(now),
                last_reset: Some(Some(now)),
                ..RecordUpdate::default()
            },
        )
        .await
    }

    /// Removes the record with `id`. Returns whether a record was removed.
    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        let Some(position) = self.position(id) else {
            debug!("Delete skipped, no record with id {id}");
            return Ok(false);
        };

        let mut next = self.records.clone();
        next.remove(position);
        self.commit(next).await?;

        debug!("Deleted record {id}");
        Ok(true)
    }

    /// Days since the record's last reset or connection, measured from now.
    #[must_use]
    pub fn days_since(&self, record: &PhoneNumberRecord) -> i64 {
        record.days_since()
    }

    /// Fresh statistics over all records.
    #[must_use]
    pub fn stats(&self) -> NumberStats {
        compute_stats(&self.records)
    }

    /// Indicator ranking built from [`Self::stats`].
    #[must_use]
    pub fn report(&self) -> IndicatorReport {
        generate_indicator_report(&self.stats())
    }

    /// Records matching `options`, in store order.
    #[must_use]
    pub fn filter(&self, options: &FilterOptions) -> Vec<&PhoneNumberRecord> {
        self.filter_at(options, Utc::now())
    }

    /// [`Self::filter`] with days measured from `now`.
    #[must_use]
    pub fn filter_at(&self, options: &FilterOptions, now: DateTime<Utc>) -> Vec<&PhoneNumberRecord> {
        filter_records(&self.records, options, now)
    }

    /// Records connected for at least `threshold_days`, measured from `now`.
    #[must_use]
    pub fn overdue_at(&self, now: DateTime<Utc>, threshold_days: i64) -> Vec<&PhoneNumberRecord> {
        self.records
            .iter()
            .filter(|record| record.is_overdue_at(now, threshold_days))
            .collect()
    }

    /// Distinct indicators, sorted.
    #[must_use]
    pub fn unique_indicators(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.indicator.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// The full list as pretty-printed JSON.
    pub fn export_snapshot(&self) -> Result<String> {
        snapshot::export_snapshot(&self.records)
    }

    /// Replaces every record with those in `text`. Returns the imported count.
    ///
    /// # Errors
    /// `Error::ImportFormat` when the text is not a valid record list; the store is
    /// left exactly as it was.
    pub async fn import_snapshot(&mut self, text: &str) -> Result<usize> {
        let imported = snapshot::parse_snapshot(text)
            .inspect_err(|e| warn!("Rejected import: {e}"))?;
        let count = imported.len();
        self.commit(imported).await?;

        info!("Imported {count} records, replacing the previous list.");
        Ok(count)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    /// Persists `next` in full, then makes it the current list.
    async fn commit(&mut self, next: Vec<PhoneNumberRecord>) -> Result<()> {
        let blob = serde_json::to_string(&next).map_err(Error::from)?;
        self.storage.write(&self.key, &blob).await?;
        self.records = next;
        debug!("Persisted {} records under '{}'", self.records.len(), self.key);
        Ok(())
    }
}
