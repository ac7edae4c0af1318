use crate::config::FilterConfig;
use url::Url;

/// Pre-fetch denylist for URLs that are never worth requesting
///
/// Rules are independent; any match excludes the URL. The filter only saves
/// wasted requests, it has no part in dedup identity.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    extensions: Vec<String>,
    patterns: Vec<String>,
}

impl UrlFilter {
    /// Builds a filter from extension suffixes and substring patterns
    pub fn new(extensions: Vec<String>, patterns: Vec<String>) -> Self {
        Self {
            extensions: extensions.into_iter().map(|e| e.to_lowercase()).collect(),
            patterns,
        }
    }

    /// Builds a filter from the `[filter]` config section
    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.skip_extensions.clone(), config.skip_patterns.clone())
    }

    /// Returns true if the URL path ends in a denylisted extension
    pub fn has_skipped_extension(&self, url: &Url) -> bool {
        let path = url.path().to_lowercase();
        self.extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }

    /// Returns true if the full URL contains a denylisted substring
    pub fn has_skipped_pattern(&self, url: &Url) -> bool {
        let raw = url.as_str();
        self.patterns.iter().any(|pattern| raw.contains(pattern.as_str()))
    }

    /// Returns true if the URL must never be fetched
    pub fn should_skip(&self, url: &Url) -> bool {
        self.has_skipped_extension(url) || self.has_skipped_pattern(url)
    }
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}
