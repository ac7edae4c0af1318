/// Page state definitions for tracking crawl progress
///
/// This module defines the lifecycle a URL moves through during a crawl.
use std::fmt;

/// Represents the current state of a URL in the crawl process
///
/// The only legal path is `Unvisited -> Queued -> Fetching -> Resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// URL has not been admitted to the frontier
    Unvisited,

    /// URL is admitted and waiting in the frontier (record status is still empty)
    Queued,

    /// A worker is fetching the URL
    Fetching,

    /// The fetch completed and the record holds its outcome
    Resolved,
}

impl PageState {
    /// Returns true if no further processing will happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// Returns true if `next` directly follows this state
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Unvisited, Self::Queued)
                | (Self::Queued, Self::Fetching)
                | (Self::Fetching, Self::Resolved)
        )
    }

    /// Lowercase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unvisited => "unvisited",
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Resolved => "resolved",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![Self::Unvisited, Self::Queued, Self::Fetching, Self::Resolved]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
