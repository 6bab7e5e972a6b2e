//! Record filtering.
//!
//! Every active criterion must match (logical AND). Empty strings and `None`
//! disable a criterion, which is how a blank filter form behaves.

use crate::core::record::{PhoneNumberRecord, parse_timestamp};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Tri-state scammer filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScammerFilter {
    /// No filtering on the flag
    #[default]
    All,
    /// Only records flagged as scammers
    Yes,
    /// Only records not flagged
    No,
}

impl ScammerFilter {
    const fn accepts(self, is_scammer: bool) -> bool {
        match self {
            Self::All => true,
            Self::Yes => is_scammer,
            Self::No => !is_scammer,
        }
    }
}

/// Filter criteria as entered in the filter form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterOptions {
    /// Matches number, indicator or notes
    pub search: String,
    /// Exact indicator match
    pub indicator: String,
    /// Scammer flag filter
    #[serde(rename = "isScammer")]
    pub scammer: ScammerFilter,
    /// Inclusive lower bound on the connection date
    pub date_from: String,
    /// Inclusive upper bound on the connection date
    pub date_to: String,
    /// Minimum days connected
    pub days_since: Option<i64>,
}

impl FilterOptions {
    /// Whether `record` satisfies every active criterion, with days measured from `now`.
    #[must_use]
    pub fn matches(&self, record: &PhoneNumberRecord, now: DateTime<Utc>) -> bool {
        self.matches_search(record)
            && (self.indicator.is_empty() || record.indicator == self.indicator)
            && self.scammer.accepts(record.is_scammer)
            && self.matches_dates(record)
            && self
                .days_since
                .is_none_or(|minimum| record.days_since_at(now) >= minimum)
    }

    fn matches_search(&self, record: &PhoneNumberRecord) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();

        record.number.contains(&needle)
            || record.indicator.to_lowercase().contains(&needle)
            || record
                .notes
                .as_ref()
                .is_some_and(|notes| notes.to_lowercase().contains(&needle))
    }

    fn matches_dates(&self, record: &PhoneNumberRecord) -> bool {
        let connected = record.date_connected;
        parse_bound(&self.date_from).is_none_or(|from| connected >= from)
            && parse_bound(&self.date_to).is_none_or(|to| connected <= to)
    }
}

/// Filters `records` in order, keeping those that match `options`.
#[must_use]
pub fn filter_records<'a>(
    records: &'a [PhoneNumberRecord],
    options: &FilterOptions,
    now: DateTime<Utc>,
) -> Vec<&'a PhoneNumberRecord> {
    records
        .iter()
        .filter(|record| options.matches(record, now))
        .collect()
}

/// Parses a date bound: RFC 3339, or `YYYY-MM-DD` meaning UTC midnight.
///
/// Empty or unparsable bounds are `None` and disable the criterion.
#[must_use]
pub fn parse_bound(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    parse_timestamp(raw).or_else(|| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc())
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{at, record_at};

    fn sample() -> Vec<PhoneNumberRecord> {
        let mut ana = record_at("555-0100", "Ana", at("2024-01-01T10:00:00Z"));
        ana.notes = Some("Met at the Market".to_string());
        let mut ana_scam = record_at("555-0200", "Ana", at("2024-01-10T10:00:00Z"));
        ana_scam.is_scammer = true;
        let mut bob = record_at("777-0300", "Bob", at("2024-01-20T10:00:00Z"));
        bob.is_scammer = true;
        vec![ana, ana_scam, bob]
    }

    fn numbers(records: &[&PhoneNumberRecord]) -> Vec<String> {
        records.iter().map(|r| r.number.clone()).collect()
    }

    fn now() -> DateTime<Utc> {
        at("2024-01-31T10:00:00Z")
    }

    #[test]
    fn test_default_options_match_everything_in_order() {
        let records = sample();
        let result = filter_records(&records, &FilterOptions::default(), now());
        assert_eq!(numbers(&result), vec!["555-0100", "555-0200", "777-0300"]);
    }

    #[test]
    fn test_scammer_yes_keeps_insertion_order() {
        let records = sample();
        let options = FilterOptions {
            scammer: ScammerFilter::Yes,
            ..FilterOptions::default()
        };
        let result = filter_records(&records, &options, now());
        assert_eq!(numbers(&result), vec!["555-0200", "777-0300"]);

        let options = FilterOptions {
            scammer: ScammerFilter::No,
            ..FilterOptions::default()
        };
        assert_eq!(numbers(&filter_records(&records, &options, now())), vec!["555-0100"]);
    }

    #[test]
    fn test_search_is_case_insensitive_on_indicator_and_notes() {
        let records = sample();
        let by_indicator = FilterOptions {
            search: "bOB".to_string(),
            ..FilterOptions::default()
        };
        assert_eq!(
            numbers(&filter_records(&records, &by_indicator, now())),
            vec!["777-0300"]
        );

        let by_notes = FilterOptions {
            search: "MARKET".to_string(),
            ..FilterOptions::default()
        };
        assert_eq!(
            numbers(&filter_records(&records, &by_notes, now())),
            vec!["555-0100"]
        );
    }

    #[test]
    fn test_search_matches_number_substring() {
        let records = sample();
        let options = FilterOptions {
            search: "555-0".to_string(),
            ..FilterOptions::default()
        };
        assert_eq!(
            numbers(&filter_records(&records, &options, now())),
            vec!["555-0100", "555-0200"]
        );
    }

    #[test]
    fn test_indicator_is_exact_match() {
        let records = sample();
        let options = FilterOptions {
            indicator: "An".to_string(),
            ..FilterOptions::default()
        };
        assert!(filter_records(&records, &options, now()).is_empty());

        let options = FilterOptions {
            indicator: "Ana".to_string(),
            ..FilterOptions::default()
        };
        assert_eq!(filter_records(&records, &options, now()).len(), 2);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let records = sample();
        let options = FilterOptions {
            date_from: "2024-01-10T10:00:00Z".to_string(),
            date_to: "2024-01-20T10:00:00.000Z".to_string(),
            ..FilterOptions::default()
        };
        assert_eq!(
            numbers(&filter_records(&records, &options, now())),
            vec!["555-0200", "777-0300"]
        );
    }

    #[test]
    fn test_plain_date_bound_means_utc_midnight() {
        let records = sample();
        let options = FilterOptions {
            date_to: "2024-01-10".to_string(),
            ..FilterOptions::default()
        };
        // 2024-01-10T10:00 is after midnight, so only the first record remains
        assert_eq!(
            numbers(&filter_records(&records, &options, now())),
            vec!["555-0100"]
        );
    }

    #[test]
    fn test_unparsable_bound_is_ignored() {
        let records = sample();
        let options = FilterOptions {
            date_from: "not a date".to_string(),
            ..FilterOptions::default()
        };
        assert_eq!(filter_records(&records, &options, now()).len(), 3);
    }

    #[test]
    fn test_days_since_minimum() {
        let records = sample();
        let options = FilterOptions {
            days_since: Some(21),
            ..FilterOptions::default()
        };
        assert_eq!(
            numbers(&filter_records(&records, &options, now())),
            vec!["555-0100", "555-0200"]
        );
    }

    #[test]
    fn test_criteria_combine_with_and() {
        let records = sample();
        let options = FilterOptions {
            indicator: "Ana".to_string(),
            scammer: ScammerFilter::Yes,
            days_since: Some(30),
            ..FilterOptions::default()
        };
        assert!(filter_records(&records, &options, now()).is_empty());
    }

    #[test]
    fn test_options_deserialize_from_form_json() {
        let options: FilterOptions =
            serde_json::from_str(r#"{"search":"","isScammer":"yes","daysSince":null}"#).unwrap();
        assert_eq!(options.scammer, ScammerFilter::Yes);
        assert!(options.days_since.is_none());
        assert!(options.date_from.is_empty());
    }
}
