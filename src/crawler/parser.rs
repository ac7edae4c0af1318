//! HTML link extraction
//!
//! Parsing is best-effort: html5ever recovers from any malformed markup, so
//! a broken page yields fewer links, never an error.

use crate::url::{canonicalize, UrlFilter};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts the distinct canonical URLs linked from `<a href>` tags
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document, resolved against `base_url`
///
/// **Exclude:**
/// - Empty and fragment-only hrefs
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Anything that is not http(s) after resolution
/// - URLs matching the filter's patterns (checked before canonicalization,
///   so pagination queries are still visible)
/// - URLs whose path ends in a denylisted extension
///
/// Links are returned in document order with duplicates removed.
///
/// # Example
///
/// ```
/// use ripple_check::crawler::extract_links;
/// use ripple_check::url::UrlFilter;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page?x=1">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &base_url, &UrlFilter::default());
/// assert_eq!(links[0].as_str(), "https://example.com/page");
/// ```
pub fn extract_links(html: &str, base_url: &Url, filter: &UrlFilter) -> Vec<Url> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(absolute) = resolve_link(href, base_url) else {
            continue;
        };
        if filter.has_skipped_pattern(&absolute) {
            continue;
        }

        let canonical = canonicalize(&absolute);
        if filter.has_skipped_extension(&canonical) {
            continue;
        }

        if seen.insert(canonical.to_string()) {
            links.push(canonical);
        }
    }

    links
}

/// Resolves a link href to an absolute http(s) URL
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}
