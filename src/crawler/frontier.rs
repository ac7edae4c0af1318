//! Crawl frontier: FIFO queue plus visited set
//!
//! Both structures sit behind one mutex and are only reachable through
//! [`Frontier::try_admit`] and [`Frontier::take_batch`], each of which is a
//! single critical section. No network I/O ever happens while the lock is held.

use crate::url::canonicalize;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Canonical URL to fetch
    pub url: Url,

    /// Page the URL was discovered on; informational only, never part of identity
    pub source: String,
}

#[derive(Debug, Default)]
struct FrontierInner {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
}

/// Thread-safe breadth-first frontier with at-most-once admission
///
/// The visited set counts every URL ever admitted, so it doubles as the page
/// cap counter: once it holds `page_cap` URLs nothing else is admitted.
#[derive(Debug)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
    page_cap: usize,
}

impl Frontier {
    /// Creates an empty frontier admitting at most `page_cap` URLs
    pub fn new(page_cap: usize) -> Self {
        Self {
            inner: Mutex::new(FrontierInner::default()),
            page_cap,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admits a URL if it is unseen and the cap has room
    ///
    /// Returns true if the URL was added to both the visited set and the queue
    /// tail; false leaves the frontier untouched.
    pub fn try_admit(&self, url: Url, source: &str) -> bool {
        self.try_admit_with(url, source, |_| {})
    }

    /// Like [`try_admit`](Self::try_admit), running `on_admit` with the
    /// canonical URL before the entry becomes visible to `take_batch`
    pub fn try_admit_with<F>(&self, url: Url, source: &str, on_admit: F) -> bool
    where
        F: FnOnce(&Url),
    {
        let canonical = canonicalize(&url);
        let mut inner = self.lock();

        if inner.visited.len() >= self.page_cap || inner.visited.contains(canonical.as_str()) {
            return false;
        }

        inner.visited.insert(canonical.to_string());
        on_admit(&canonical);
        inner.queue.push_back(FrontierEntry {
            url: canonical,
            source: source.to_string(),
        });
        true
    }

    /// Removes and returns up to `n` entries from the head of the queue
    pub fn take_batch(&self, n: usize) -> Vec<FrontierEntry> {
        let mut inner = self.lock();
        let count = n.min(inner.queue.len());
        inner.queue.drain(..count).collect()
    }

    /// Number of entries waiting in the queue
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Number of distinct URLs ever admitted
    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    /// Returns true once the page cap is reached
    pub fn is_full(&self) -> bool {
        self.visited_count() >= self.page_cap
    }
}
