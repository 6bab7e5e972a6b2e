//! Indicator report generation.
//!
//! This module ranks indicators by how many of their referrals turned out to be
//! scammers and renders the result as text. All functions are pure and work on
//! [`NumberStats`], so any presentation layer can format the data its own way.

use crate::core::stats::{IndicatorStats, NumberStats, percentage};
use std::fmt::Write;

/// An indicator together with its counts.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedIndicator {
    /// Indicator name
    pub indicator: String,
    /// Counts for this indicator
    pub stats: IndicatorStats,
}

/// Summary of the whole store and per-indicator quality.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorReport {
    /// Record count
    pub total: usize,
    /// Records flagged as scammers
    pub scammers: usize,
    /// Records not flagged
    pub legitimate: usize,
    /// Share of scammers, 0 for an empty store
    pub scammer_percentage: f64,
    /// Share of legitimate numbers, 0 for an empty store
    pub legitimate_percentage: f64,
    /// Indicators ordered by scam percentage, highest first
    pub ranked: Vec<RankedIndicator>,
}

impl IndicatorReport {
    /// Number of distinct indicators.
    #[must_use]
    pub fn indicator_count(&self) -> usize {
        self.ranked.len()
    }

    /// Indicator with the lowest scam percentage.
    #[must_use]
    pub fn best(&self) -> Option<&RankedIndicator> {
        self.ranked.last()
    }

    /// Indicator with the highest scam percentage.
    #[must_use]
    pub fn worst(&self) -> Option<&RankedIndicator> {
        self.ranked.first()
    }
}

/// Builds an [`IndicatorReport`] from precomputed statistics.
///
/// Ties keep indicator-name order, since the breakdown map is already sorted.
#[must_use]
pub fn generate_indicator_report(stats: &NumberStats) -> IndicatorReport {
    let mut ranked: Vec<RankedIndicator> = stats
        .by_indicator
        .iter()
        .map(|(indicator, stats)| RankedIndicator {
            indicator: indicator.clone(),
            stats: *stats,
        })
        .collect();
    ranked.sort_by(|a, b| b.stats.percentage.total_cmp(&a.stats.percentage));

    let legitimate = stats.total - stats.scammers;
    let (scammer_percentage, legitimate_percentage) = if stats.total == 0 {
        (0.0, 0.0)
    } else {
        (
            percentage(stats.scammers, stats.total),
            percentage(legitimate, stats.total),
        )
    };

    IndicatorReport {
        total: stats.total,
        scammers: stats.scammers,
        legitimate,
        scammer_percentage,
        legitimate_percentage,
        ranked,
    }
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // clamped_progress ∈ [0, 100] and length is small, so the product fits in usize.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);

    format!("[{filled_str}{empty_str}] {progress_percent:.1}%")
}

/// Renders the report as plain text, one indicator per line.
#[must_use]
pub fn format_report(report: &IndicatorReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Numbers: {} | Scammers: {} ({:.1}%) | Legitimate: {} ({:.1}%) | Indicators: {}",
        report.total,
        report.scammers,
        report.scammer_percentage,
        report.legitimate,
        report.legitimate_percentage,
        report.indicator_count()
    );

    if report.ranked.is_empty() {
        out.push_str("No indicators yet. Add some numbers to see the report.\n");
        return out;
    }

    if let (Some(best), Some(worst)) = (report.best(), report.worst()) {
        let _ = writeln!(
            out,
            "Best indicator: {} ({:.1}% legitimate, {} of {} scammers)",
            best.indicator,
            100.0 - best.stats.percentage,
            best.stats.scammers,
            best.stats.total
        );
        let _ = writeln!(
            out,
            "Worst indicator: {} ({:.1}% scams, {} of {} scammers)",
            worst.indicator, worst.stats.percentage, worst.stats.scammers, worst.stats.total
        );
    }

    for entry in &report.ranked {
        let _ = writeln!(
            out,
            "{:<20} {} {}/{}",
            entry.indicator,
            format_progress_bar(entry.stats.percentage, None),
            entry.stats.scammers,
            entry.stats.total
        );
    }

    out
}
