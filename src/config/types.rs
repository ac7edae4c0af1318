use serde::Deserialize;

/// Main configuration structure for Ripple-Check
///
/// Every section is optional; an empty file yields [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub filter: FilterConfig,
    pub redirect: RedirectConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of distinct URLs admitted to the frontier
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Number of concurrent fetch workers
    pub workers: usize,

    /// Delay between batch dispatches (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 5000,
            workers: 8,
            delay_ms: 100,
            timeout_secs: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "LinkChecker".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// Format: `Mozilla/5.0 (compatible; Name/Version[; +ContactURL])`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "Mozilla/5.0 (compatible; {}/{}; +{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!(
                "Mozilla/5.0 (compatible; {}/{})",
                self.crawler_name, self.crawler_version
            ),
        }
    }
}

/// Pre-fetch URL denylists
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Path suffixes that are never fetched (matched case-insensitively)
    #[serde(rename = "skip-extensions")]
    pub skip_extensions: Vec<String>,

    /// Substrings that exclude a URL wherever they appear
    #[serde(rename = "skip-patterns")]
    pub skip_patterns: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            skip_extensions: [
                ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".pdf", ".zip", ".mp4", ".mp3",
                ".woff", ".woff2", ".css", ".js",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            skip_patterns: ["?page=", "&page=", "/cdn-cgi/"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Redirect handling configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Substrings of a redirect target that mark it as a "soft 404".
    /// An empty list disables the heuristic.
    #[serde(rename = "not-found-markers")]
    pub not_found_markers: Vec<String>,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            not_found_markers: vec!["/404".to_string(), "not-found".to_string()],
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where to write the broken link CSV; a timestamped name is used when unset
    #[serde(rename = "csv-path")]
    pub csv_path: Option<String>,
}
