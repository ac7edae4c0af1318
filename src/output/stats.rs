//! Statistics over crawl results
//!
//! This module provides functionality for summarizing and displaying
//! the records returned by a crawl.

use crate::output::broken_records;
use crate::state::{CrawlRecord, LinkType};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Total number of distinct URLs admitted
    pub total_records: usize,

    /// Records that reached a terminal state
    pub resolved: usize,

    /// Records never fetched (cancellation)
    pub unresolved: usize,

    /// Records with a status in the broken set
    pub broken: usize,

    /// Resolved records with no HTTP response
    pub transport_errors: usize,

    pub internal: usize,
    pub external: usize,

    /// Records whose final URL differs from the requested one
    pub redirected: usize,
}

impl CrawlStatistics {
    pub fn from_records(records: &[CrawlRecord]) -> Self {
        let mut stats = Self {
            total_records: records.len(),
            ..Self::default()
        };

        for record in records {
            if record.is_resolved() {
                stats.resolved += 1;
            } else {
                stats.unresolved += 1;
            }
            if record.is_broken() {
                stats.broken += 1;
            }
            if record.is_transport_failure() {
                stats.transport_errors += 1;
            }
            match record.link_type {
                LinkType::Internal => stats.internal += 1,
                LinkType::External => stats.external += 1,
            }
            if !record.final_url.is_empty() {
                stats.redirected += 1;
            }
        }

        stats
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Total URLs: {}", stats.total_records);
    println!("  Internal: {}", stats.internal);
    println!("  External: {}", stats.external);
    println!();

    println!("Results:");
    println!("  Resolved: {}", stats.resolved);
    if stats.unresolved > 0 {
        println!("  Unresolved (crawl stopped early): {}", stats.unresolved);
    }
    println!("  Redirected: {}", stats.redirected);
    println!("  Transport errors: {}", stats.transport_errors);
    println!("  Broken: {}", stats.broken);
    println!();

    let healthy = stats.resolved.saturating_sub(stats.broken + stats.transport_errors);
    let health_rate = if stats.resolved > 0 {
        (healthy as f64 / stats.resolved as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Health: {:.1}% ({} / {} resolved URLs healthy)",
        health_rate, healthy, stats.resolved
    );
}

/// Prints the broken link table, or a notice when there is none
pub fn print_broken_links(records: &[CrawlRecord]) {
    let broken = broken_records(records);
    if broken.is_empty() {
        println!("No broken links found");
        return;
    }

    println!("Broken Links ({}):", broken.len());
    for record in broken {
        let status = record.status.map(|s| s.to_string()).unwrap_or_default();
        println!("  [{}] {}", status, record.url);
        println!("        found on {}", record.source_page);
        if !record.error.is_empty() {
            println!("        error: {}", record.error);
        }
    }
}
