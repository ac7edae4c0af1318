//! Soft-404 detection for redirect targets
//!
//! Some sites answer a missing page with a redirect to an error page instead
//! of a 404. The fetcher asks a [`SoftNotFound`] predicate about each
//! redirect target and reports a match as a 404 without following it.

use crate::config::RedirectConfig;
use url::Url;

/// Decides whether a redirect target stands for a missing page
pub trait SoftNotFound: Send + Sync {
    fn is_soft_not_found(&self, location: &Url) -> bool;
}

impl<F> SoftNotFound for F
where
    F: Fn(&Url) -> bool + Send + Sync,
{
    fn is_soft_not_found(&self, location: &Url) -> bool {
        self(location)
    }
}

/// Substring heuristic over the resolved redirect target
///
/// With the default markers, `/404` and `not-found` anywhere in the URL count
/// as a soft 404. This can misfire on legitimate pages whose path contains a
/// marker; an empty marker list turns detection off.
#[derive(Debug, Clone)]
pub struct MarkerSoftNotFound {
    markers: Vec<String>,
}

impl MarkerSoftNotFound {
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    pub fn from_config(config: &RedirectConfig) -> Self {
        Self::new(config.not_found_markers.clone())
    }

    /// A matcher that never reports a soft 404
    pub fn disabled() -> Self {
        Self::new(Vec::new())
    }

    pub fn is_disabled(&self) -> bool {
        self.markers.is_empty()
    }
}

impl Default for MarkerSoftNotFound {
    fn default() -> Self {
        Self::from_config(&RedirectConfig::default())
    }
}

impl SoftNotFound for MarkerSoftNotFound {
    fn is_soft_not_found(&self, location: &Url) -> bool {
        let target = location.as_str();
        self.markers.iter().any(|marker| target.contains(marker.as_str()))
    }
}
