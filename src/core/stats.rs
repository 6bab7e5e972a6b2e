//! Aggregate statistics over the record list.
//!
//! Recomputed on every call; nothing here is cached or persisted.

use crate::core::record::PhoneNumberRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts for a single indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IndicatorStats {
    /// Records credited to this indicator
    pub total: usize,
    /// How many of those are flagged as scammers
    pub scammers: usize,
    /// `scammers / total * 100`, 0 when there are no records
    pub percentage: f64,
}

/// Totals across the whole store plus a per-indicator breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberStats {
    /// Record count
    pub total: usize,
    /// Records flagged as scammers
    pub scammers: usize,
    /// Breakdown keyed by indicator, in indicator order
    pub by_indicator: BTreeMap<String, IndicatorStats>,
}

/// Computes [`NumberStats`] in one pass over `records`.
#[must_use]
pub fn compute_stats(records: &[PhoneNumberRecord]) -> NumberStats {
    let mut stats = NumberStats::default();

    for record in records {
        stats.total += 1;
        let entry = stats
            .by_indicator
            .entry(record.indicator.clone())
            .or_default();
        entry.total += 1;
        if record.is_scammer {
            stats.scammers += 1;
            entry.scammers += 1;
        }
    }

    for entry in stats.by_indicator.values_mut() {
        entry.percentage = percentage(entry.scammers, entry.total);
    }

    stats
}

/// `part / whole * 100`, or 0 when `whole` is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)] // record counts stay far below 2^52
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64) * 100.0
}
