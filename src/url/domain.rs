use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ripple_check::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Extracts the authority (`host` or `host:port`) that identifies a site
///
/// Default ports are omitted by the URL parser, so `https://example.com:443/`
/// and `https://example.com/` share an authority. Two URLs belong to the same
/// crawl domain exactly when their authorities are equal.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ripple_check::url::extract_authority;
///
/// let url = Url::parse("http://127.0.0.1:8080/a").unwrap();
/// assert_eq!(extract_authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Returns true if `url` belongs to the crawl identified by `authority`
pub fn is_internal(url: &Url, authority: &str) -> bool {
    extract_authority(url).as_deref() == Some(authority)
}
