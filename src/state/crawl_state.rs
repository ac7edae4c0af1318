//! Aggregate state of a single crawl invocation
//!
//! Two crawls never share a `CrawlState`; each coordinator creates its own.

use crate::crawler::{FetchOutcome, Frontier, FrontierEntry};
use crate::state::{is_broken_status, CrawlRecord, LinkType, ProgressSnapshot, RecordBook};
use crate::RippleError;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// Frontier, visited set, result records and progress counters of one crawl
#[derive(Debug)]
pub struct CrawlState {
    frontier: Frontier,
    records: RecordBook,
    started: AtomicUsize,
    processed: AtomicUsize,
    broken: AtomicUsize,
}

impl CrawlState {
    pub fn new(page_cap: usize) -> Self {
        Self {
            frontier: Frontier::new(page_cap),
            records: RecordBook::new(),
            started: AtomicUsize::new(0),
            processed: AtomicUsize::new(0),
            broken: AtomicUsize::new(0),
        }
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Admits a URL and registers its placeholder record
    ///
    /// The record is written inside the frontier's critical section, so a
    /// worker can never dequeue a URL whose record does not exist yet.
    pub fn admit(&self, url: Url, source_page: &str, link_type: LinkType) -> bool {
        self.frontier.try_admit_with(url, source_page, |canonical| {
            if let Err(e) = self.records.register(canonical, source_page, link_type) {
                tracing::warn!("{}", e);
            }
        })
    }

    /// Removes up to `n` entries from the head of the frontier
    pub fn take_batch(&self, n: usize) -> Vec<FrontierEntry> {
        self.frontier.take_batch(n)
    }

    /// Marks a dequeued URL as being fetched
    pub fn begin_fetch(&self, url: &Url) -> Result<(), RippleError> {
        self.records.mark_fetching(url)?;
        self.started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Records the outcome of a fetch
    pub fn complete_fetch(&self, url: &Url, outcome: &FetchOutcome) -> Result<(), RippleError> {
        self.records.resolve(url, outcome)?;
        if is_broken_status(outcome.status) {
            self.broken.fetch_add(1, Ordering::SeqCst);
        }
        self.processed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Current progress counters
    pub fn snapshot(&self) -> ProgressSnapshot {
        let processed = self.processed.load(Ordering::SeqCst);
        let started = self.started.load(Ordering::SeqCst);
        let admitted = self.frontier.visited_count();

        ProgressSnapshot {
            pages_processed: processed,
            pages_broken: self.broken.load(Ordering::SeqCst),
            pages_queued: admitted.saturating_sub(started),
            pages_in_flight: started.saturating_sub(processed),
            pages_admitted: admitted,
        }
    }

    /// Copy of all records in admission order
    pub fn records(&self) -> Vec<CrawlRecord> {
        self.records.records()
    }

    pub fn record(&self, url: &str) -> Option<CrawlRecord> {
        self.records.get(url)
    }
}
