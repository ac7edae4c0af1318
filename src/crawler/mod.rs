//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with the two-phase redirect protocol
//! - Soft-404 detection on redirect targets
//! - HTML link extraction
//! - The shared frontier and visited set
//! - Overall crawl coordination, cancellation and progress

mod control;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod redirect;

pub use control::{CancellationFlag, CrawlHandle};
pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, is_redirect, FetchOutcome, Fetcher};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::extract_links;
pub use redirect::{MarkerSoftNotFound, SoftNotFound};
