//! State module for tracking crawl progress
//!
//! This module provides state management for URLs during the crawl process.
//!
//! # Components
//!
//! - `PageState`: Lifecycle of a single URL (unvisited, queued, fetching, resolved)
//! - `CrawlRecord` / `RecordBook`: Per-URL results, created on admission and resolved once
//! - `ProgressSnapshot`: Pollable progress counters
//! - `CrawlState`: Everything one crawl invocation owns

mod crawl_state;
mod page_state;
mod progress;
mod record;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_state::PageState;
pub use progress::ProgressSnapshot;
pub use record::{is_broken_status, CrawlRecord, LinkType, RecordBook, BROKEN_STATUS_CODES};
