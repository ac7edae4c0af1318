//! Output module for crawl reports
//!
//! This module handles:
//! - Exporting the broken link subset as CSV
//! - Computing and printing crawl statistics

mod export;
pub mod stats;

pub use export::{
    broken_records, csv_filename_at, default_csv_filename, export_broken_csv, write_broken_csv,
    CSV_HEADER,
};
pub use stats::{print_broken_links, print_statistics, CrawlStatistics};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
