//! Core business logic - framework-agnostic record store, filtering, statistics and
//! snapshot handling. Nothing in here knows how records are displayed.

/// Record filtering by search text, indicator, flag, dates and age
pub mod filter;
/// Phone-number records and their create/update inputs
pub mod record;
/// Indicator ranking and text rendering
pub mod report;
/// JSON export and validated import
pub mod snapshot;
/// Aggregate counts per indicator
pub mod stats;
/// The owned, persisted record list
pub mod store;

pub use filter::{FilterOptions, ScammerFilter};
pub use record::{NewEntry, PhoneNumberRecord, RecordUpdate, parse_bulk_entries};
pub use report::IndicatorReport;
pub use stats::{IndicatorStats, NumberStats};
pub use store::RecordStore;
