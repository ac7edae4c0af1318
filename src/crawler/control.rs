//! Host-facing crawl controls: cancellation and progress polling

use crate::state::{CrawlState, ProgressSnapshot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag
///
/// Setting it stops the coordinator from dispatching new fetches. Fetches
/// already on the wire run to completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Cloneable handle to a running crawl
#[derive(Debug, Clone)]
pub struct CrawlHandle {
    state: Arc<CrawlState>,
    cancel: CancellationFlag,
}

impl CrawlHandle {
    pub(crate) fn new(state: Arc<CrawlState>, cancel: CancellationFlag) -> Self {
        Self { state, cancel }
    }

    /// Current progress; safe to call at any time from any thread
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.state.snapshot()
    }

    /// Requests cancellation
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
