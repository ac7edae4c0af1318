use std::fmt;

/// Point-in-time view of crawl progress, safe to poll at any time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// URLs whose fetch has completed
    pub pages_processed: usize,

    /// Completed URLs with a broken status
    pub pages_broken: usize,

    /// URLs admitted but not yet picked up by a worker
    pub pages_queued: usize,

    /// URLs a worker is currently fetching
    pub pages_in_flight: usize,

    /// Distinct URLs admitted so far (the visited-set size)
    pub pages_admitted: usize,
}

impl ProgressSnapshot {
    /// Share of known work that is done, 0..=100
    pub fn percent_complete(&self) -> u8 {
        let known = (self.pages_processed + self.pages_queued).max(1);
        ((self.pages_processed * 100) / known).min(100) as u8
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages scanned, {} broken, {} remaining ({}%)",
            self.pages_processed,
            self.pages_broken,
            self.pages_queued + self.pages_in_flight,
            self.percent_complete()
        )
    }
}
