//! Output module for run summaries and catalog reports
//!
//! This module handles:
//! - The one-line summary logged after each store's run
//! - Loading and printing statistics from the catalog database

pub mod stats;

pub use stats::{load_statistics, print_statistics, CatalogStatistics};

use crate::crawler::RunReport;

/// Formats the summary line of a finished run
///
/// ```text
/// [AUCHAN] 1520 items was loaded to DB from 87 unique categories
/// ```
pub fn format_run_summary(report: &RunReport) -> String {
    format!(
        "[{}] {} items was loaded to DB from {} unique categories",
        report.store_slug.to_uppercase(),
        report.item_count(),
        report.unique_categories
    )
}
