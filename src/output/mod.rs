//! Output module for sync reports and stored-catalog summaries

pub mod stats;

pub use stats::{load_statistics, print_statistics, CatalogStatistics};

use crate::sync::SyncReport;

/// Prints a finished sync to stdout
pub fn print_sync_report(report: &SyncReport) {
    println!("=== Sync Complete ===\n");
    println!("  Total items reported: {}", report.total_items);
    println!("  Pages fetched: {}", report.pages);
    println!("  Items stored: {}", report.items_stored);
    println!("  Elapsed: {:.2}s", report.elapsed.as_secs_f64());

    if report.items_stored as u64 != report.total_items {
        println!(
            "\n  Note: stored count differs from the reported total by {}",
            report.total_items.abs_diff(report.items_stored as u64)
        );
    }
}
