//! Per-URL crawl result records
//!
//! A record is created when its URL is admitted to the frontier and updated
//! exactly once when the fetch completes. Workers never hold a record; they
//! report through [`RecordBook`], whose lock is taken once per operation.

use crate::crawler::FetchOutcome;
use crate::state::PageState;
use crate::url::is_internal;
use crate::RippleError;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// HTTP statuses reported as broken links
pub const BROKEN_STATUS_CODES: [u16; 5] = [404, 410, 500, 502, 503];

/// Returns true if the status counts as a broken link
pub fn is_broken_status(status: Option<u16>) -> bool {
    status.map_or(false, |code| BROKEN_STATUS_CODES.contains(&code))
}

/// Whether a URL belongs to the crawled site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
    Internal,
    External,
}

impl LinkType {
    /// Classifies a URL against the crawl authority
    pub fn classify(url: &Url, authority: &str) -> Self {
        if is_internal(url, authority) {
            Self::Internal
        } else {
            Self::External
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of crawling one distinct URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRecord {
    /// Page the URL was first discovered on (the start URL for the seed)
    pub source_page: String,

    /// Canonical URL
    pub url: String,

    /// HTTP status; `None` until resolved, or after a transport failure
    pub status: Option<u16>,

    /// URL after redirect resolution; empty when unchanged
    pub final_url: String,

    /// Error description; empty when none
    pub error: String,

    pub link_type: LinkType,

    pub state: PageState,
}

impl CrawlRecord {
    /// Placeholder for a freshly discovered URL, not yet admitted
    pub fn discovered(url: &Url, source_page: &str, link_type: LinkType) -> Self {
        Self {
            source_page: source_page.to_string(),
            url: url.to_string(),
            status: None,
            final_url: String::new(),
            error: String::new(),
            link_type,
            state: PageState::Unvisited,
        }
    }

    pub fn is_broken(&self) -> bool {
        is_broken_status(self.status)
    }

    pub fn is_resolved(&self) -> bool {
        self.state.is_terminal()
    }

    /// True for resolved records that never got an HTTP response
    pub fn is_transport_failure(&self) -> bool {
        self.is_resolved() && self.status.is_none()
    }

    fn transition(&mut self, next: PageState) -> Result<(), RippleError> {
        if !self.state.can_transition_to(next) {
            return Err(RippleError::InvalidTransition {
                url: self.url.clone(),
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RecordBookInner {
    records: Vec<CrawlRecord>,
    index: HashMap<String, usize>,
}

/// Ordered, synchronized collection of crawl records
///
/// Records keep admission order, which is breadth-first discovery order.
#[derive(Debug, Default)]
pub struct RecordBook {
    inner: Mutex<RecordBookInner>,
}

impl RecordBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RecordBookInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a queued placeholder record; returns false if the URL already has one
    pub fn register(
        &self,
        url: &Url,
        source_page: &str,
        link_type: LinkType,
    ) -> Result<bool, RippleError> {
        let mut inner = self.lock();
        if inner.index.contains_key(url.as_str()) {
            return Ok(false);
        }
        let mut record = CrawlRecord::discovered(url, source_page, link_type);
        record.transition(PageState::Queued)?;

        let position = inner.records.len();
        inner.index.insert(url.to_string(), position);
        inner.records.push(record);
        Ok(true)
    }

    /// Moves a record from `Queued` to `Fetching`
    pub fn mark_fetching(&self, url: &Url) -> Result<(), RippleError> {
        self.update(url, PageState::Fetching, |record| {
            record.transition(PageState::Fetching)
        })
    }

    /// Stores the fetch outcome and moves the record to `Resolved`
    pub fn resolve(&self, url: &Url, outcome: &FetchOutcome) -> Result<(), RippleError> {
        self.update(url, PageState::Resolved, |record| {
            record.transition(PageState::Resolved)?;
            record.status = outcome.status;
            record.final_url = if outcome.final_url == record.url {
                String::new()
            } else {
                outcome.final_url.clone()
            };
            record.error = outcome.error.clone().unwrap_or_default();
            Ok(())
        })
    }

    fn update<F>(&self, url: &Url, to: PageState, apply: F) -> Result<(), RippleError>
    where
        F: FnOnce(&mut CrawlRecord) -> Result<(), RippleError>,
    {
        let mut inner = self.lock();
        let position = inner
            .index
            .get(url.as_str())
            .copied()
            .ok_or_else(|| RippleError::InvalidTransition {
                url: url.to_string(),
                from: PageState::Unvisited,
                to,
            })?;
        apply(&mut inner.records[position])
    }

    /// Returns a copy of one record
    pub fn get(&self, url: &str) -> Option<CrawlRecord> {
        let inner = self.lock();
        inner
            .index
            .get(url)
            .map(|&position| inner.records[position].clone())
    }

    /// Returns a copy of all records in admission order
    pub fn records(&self) -> Vec<CrawlRecord> {
        self.lock().records.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
