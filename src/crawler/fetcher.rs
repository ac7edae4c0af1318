//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the crawler's user agent
//! - The two-phase redirect protocol (manual first hop, then full follow)
//! - Soft-404 short-circuiting on redirect targets
//! - Mapping transport failures to values instead of errors

use crate::config::UserAgentConfig;
use crate::crawler::redirect::SoftNotFound;
use crate::url::is_internal;
use reqwest::header::LOCATION;
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Maximum hops for the second, redirect-following request
const MAX_FOLLOWED_REDIRECTS: usize = 10;

/// Outcome of fetching a single URL
///
/// Fetch failures are data, not errors: a transport failure has no status and
/// carries a description in `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// HTTP status; `None` if no response was received
    pub status: Option<u16>,

    /// URL the outcome refers to after redirect resolution
    pub final_url: String,

    /// Page body, only for internal pages answering 200
    pub body: Option<String>,

    /// Description of what went wrong, if anything
    pub error: Option<String>,
}

impl FetchOutcome {
    fn transport_failure(url: &Url, error: &reqwest::Error) -> Self {
        Self {
            status: None,
            final_url: url.to_string(),
            body: None,
            error: Some(describe_error(error)),
        }
    }
}

/// Builds an HTTP client with the crawler's identity and timeout
///
/// # Example
///
/// ```no_run
/// use ripple_check::config::UserAgentConfig;
/// use ripple_check::crawler::build_http_client;
/// use reqwest::redirect::Policy;
/// use std::time::Duration;
///
/// let client = build_http_client(
///     &UserAgentConfig::default(),
///     Duration::from_secs(10),
///     Policy::none(),
/// )
/// .unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
    redirect: Policy,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(redirect)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Executes fetches for one crawl
///
/// # Request Flow
///
/// 1. GET with redirects disabled
/// 2. Not a redirect: report the status with the requested URL as final
/// 3. Redirect (301/302/303/307/308):
///    - resolve `Location` against the requested URL
///    - soft-404 target: report 404 with the target as final, no second request
///    - otherwise GET the target following redirects, report that response
/// 4. Bodies are read only for 200 responses whose requested and final URLs
///    are both internal
pub struct Fetcher {
    direct: Client,
    following: Client,
    soft_not_found: Arc<dyn SoftNotFound>,
}

impl Fetcher {
    /// Builds both clients from one user agent and timeout
    pub fn new(
        user_agent: &UserAgentConfig,
        timeout: Duration,
        soft_not_found: Arc<dyn SoftNotFound>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            direct: build_http_client(user_agent, timeout, Policy::none())?,
            following: build_http_client(
                user_agent,
                timeout,
                Policy::limited(MAX_FOLLOWED_REDIRECTS),
            )?,
            soft_not_found,
        })
    }

    /// Replaces the soft-404 predicate
    pub fn set_soft_not_found(&mut self, soft_not_found: Arc<dyn SoftNotFound>) {
        self.soft_not_found = soft_not_found;
    }

    /// Fetches `url`; `authority` identifies the crawled site
    pub async fn fetch(&self, url: &Url, authority: &str) -> FetchOutcome {
        let response = match self.direct.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Request to {} failed: {}", url, e);
                return FetchOutcome::transport_failure(url, &e);
            }
        };

        let status = response.status();
        if !is_redirect(status) {
            return read_outcome(url, url.clone(), response, authority).await;
        }

        let Some(location) = redirect_target(url, &response) else {
            tracing::debug!("{} answered {} without a usable Location", url, status);
            return FetchOutcome {
                status: Some(status.as_u16()),
                final_url: url.to_string(),
                body: None,
                error: Some("Redirect without a usable Location header".to_string()),
            };
        };

        if self.soft_not_found.is_soft_not_found(&location) {
            tracing::debug!("{} redirects to soft 404 {}", url, location);
            return FetchOutcome {
                status: Some(StatusCode::NOT_FOUND.as_u16()),
                final_url: location.to_string(),
                body: None,
                error: None,
            };
        }

        tracing::trace!("Following redirect {} -> {}", url, location);
        match self.following.get(location).send().await {
            Ok(response) => {
                let final_url = response.url().clone();
                read_outcome(url, final_url, response, authority).await
            }
            Err(e) => {
                tracing::debug!("Redirect follow from {} failed: {}", url, e);
                FetchOutcome::transport_failure(url, &e)
            }
        }
    }
}

async fn read_outcome(
    requested: &Url,
    final_url: Url,
    response: Response,
    authority: &str,
) -> FetchOutcome {
    let status = response.status();
    let wants_body = status == StatusCode::OK
        && is_internal(requested, authority)
        && is_internal(&final_url, authority);

    if !wants_body {
        return FetchOutcome {
            status: Some(status.as_u16()),
            final_url: final_url.to_string(),
            body: None,
            error: None,
        };
    }

    match response.text().await {
        Ok(body) => FetchOutcome {
            status: Some(status.as_u16()),
            final_url: final_url.to_string(),
            body: Some(body),
            error: None,
        },
        Err(e) => FetchOutcome {
            status: Some(status.as_u16()),
            final_url: final_url.to_string(),
            body: None,
            error: Some(format!("Failed to read body: {}", describe_error(&e))),
        },
    }
}

/// Returns true for the redirect statuses handled by the two-phase protocol
pub fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

fn redirect_target(requested: &Url, response: &Response) -> Option<Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?.trim();
    if location.is_empty() {
        return None;
    }
    requested.join(location).ok()
}

/// Short description of a transport failure
fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Timeout".to_string()
    } else if error.is_connect() {
        "Connection error".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else {
        error.to_string()
    }
}
