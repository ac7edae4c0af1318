//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Validating the start URL and seeding the frontier
//! - Drawing batches and dispatching them to a bounded worker pool
//! - Coordinating fetching, link extraction and admission in each worker
//! - Politeness delay, cancellation and progress reporting
//!
//! The loop itself runs on one task and owns every scheduling decision.
//! Workers share only the [`CrawlState`], whose locks are never held across
//! a network call.

use crate::config::{validate, validate_start_url, Config, CrawlerConfig};
use crate::crawler::control::{CancellationFlag, CrawlHandle};
use crate::crawler::parser::extract_links;
use crate::crawler::redirect::{MarkerSoftNotFound, SoftNotFound};
use crate::crawler::{Fetcher, FrontierEntry};
use crate::state::{is_broken_status, CrawlRecord, CrawlState, LinkType, ProgressSnapshot};
use crate::url::{extract_authority, UrlFilter};
use crate::{RippleError, UrlError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

type ProgressCallback = Arc<dyn Fn(&ProgressSnapshot) + Send + Sync>;

/// Everything a worker needs, shared read-only across tasks
struct WorkerContext {
    authority: String,
    state: Arc<CrawlState>,
    fetcher: Fetcher,
    filter: UrlFilter,
    on_progress: Option<ProgressCallback>,
}

impl WorkerContext {
    fn report_progress(&self) {
        if let Some(callback) = &self.on_progress {
            callback(&self.state.snapshot());
        }
    }
}

/// Main crawler coordinator structure
///
/// One coordinator runs one crawl. Build it with [`Coordinator::new`], take a
/// [`CrawlHandle`] if the host needs progress or cancellation, then consume
/// it with [`Coordinator::run`].
pub struct Coordinator {
    start_url: Url,
    authority: String,
    config: CrawlerConfig,
    state: Arc<CrawlState>,
    fetcher: Fetcher,
    filter: UrlFilter,
    cancel: CancellationFlag,
    on_progress: Option<ProgressCallback>,
}

impl Coordinator {
    /// Creates a new coordinator and seeds the frontier with the start URL
    ///
    /// The start URL's authority becomes the crawl's site identity. An invalid
    /// start URL or configuration fails here, before any request is made.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(RippleError::Config)` - Invalid start URL or configuration
    /// * `Err(RippleError::HttpClient)` - HTTP client could not be built
    pub fn new(start_url: &str, config: &Config) -> Result<Self, RippleError> {
        let start_url = validate_start_url(start_url)?;
        validate(config)?;

        let authority = extract_authority(&start_url).ok_or(UrlError::MissingDomain)?;

        let soft_not_found: Arc<dyn SoftNotFound> =
            Arc::new(MarkerSoftNotFound::from_config(&config.redirect));
        let fetcher = Fetcher::new(
            &config.user_agent,
            Duration::from_secs(config.crawler.timeout_secs),
            soft_not_found,
        )?;
        let filter = UrlFilter::from_config(&config.filter);

        let state = Arc::new(CrawlState::new(config.crawler.max_pages));
        if filter.should_skip(&start_url) {
            tracing::warn!(
                "Start URL {} matches the URL filter and will not be fetched",
                start_url
            );
        } else {
            state.admit(start_url.clone(), start_url.as_str(), LinkType::Internal);
        }

        Ok(Self {
            start_url,
            authority,
            config: config.crawler.clone(),
            state,
            fetcher,
            filter,
            cancel: CancellationFlag::new(),
            on_progress: None,
        })
    }

    /// Replaces the soft-404 predicate applied to redirect targets
    pub fn with_soft_not_found<S>(mut self, predicate: S) -> Self
    where
        S: SoftNotFound + 'static,
    {
        self.fetcher.set_soft_not_found(Arc::new(predicate));
        self
    }

    /// Registers a callback invoked after each batch dispatch and after
    /// each completed fetch
    ///
    /// The callback runs on worker tasks and must not block.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ProgressSnapshot) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Uses an externally owned cancellation flag
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn handle(&self) -> CrawlHandle {
        CrawlHandle::new(Arc::clone(&self.state), self.cancel.clone())
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn start_url(&self) -> &Url {
        &self.start_url
    }

    /// Runs the main crawl loop to a terminal state
    ///
    /// Each iteration:
    /// 1. Stops if cancellation was requested
    /// 2. Draws up to `2 * workers - outstanding` URLs from the frontier
    /// 3. With nothing to draw, waits for a worker to finish (it may admit
    ///    new links); with no worker left the frontier is exhausted
    /// 4. Dispatches the batch, then sleeps the politeness delay
    ///
    /// Reaching the page cap only stops admission; every admitted URL is
    /// still fetched. Outstanding workers are drained before returning.
    ///
    /// Returns every record in admission order. After cancellation, URLs that
    /// were never fetched keep a `None` status.
    pub async fn run(self) -> Result<Vec<CrawlRecord>, RippleError> {
        let Coordinator {
            start_url,
            authority,
            config,
            state,
            fetcher,
            filter,
            cancel,
            on_progress,
        } = self;

        let workers = config.workers.max(1);
        let batch_limit = workers * 2;
        let delay = Duration::from_millis(config.delay_ms);
        let permits = Arc::new(Semaphore::new(workers));
        let context = Arc::new(WorkerContext {
            authority,
            state: Arc::clone(&state),
            fetcher,
            filter,
            on_progress,
        });

        tracing::info!(
            "Starting crawl of {} ({} workers, cap {} pages, {}ms delay)",
            start_url,
            workers,
            config.max_pages,
            config.delay_ms
        );

        let start_time = Instant::now();
        let mut tasks = JoinSet::new();
        let mut batches = 0usize;

        loop {
            if cancel.is_cancelled() {
                tracing::info!("Cancellation requested, no further batches will be dispatched");
                break;
            }

            let room = batch_limit.saturating_sub(tasks.len());
            let batch = if room > 0 {
                state.take_batch(room)
            } else {
                Vec::new()
            };

            if batch.is_empty() {
                match tasks.join_next().await {
                    Some(joined) => {
                        if let Err(e) = joined {
                            tracing::error!("Worker task failed: {}", e);
                        }
                        continue;
                    }
                    None => {
                        tracing::info!("Frontier is empty, crawl complete");
                        break;
                    }
                }
            }

            batches += 1;
            tracing::debug!("Dispatching batch {} with {} URLs", batches, batch.len());

            for entry in batch {
                let context = Arc::clone(&context);
                let permits = Arc::clone(&permits);
                let cancel = cancel.clone();

                tasks.spawn(async move {
                    let Ok(_permit) = permits.acquire_owned().await else {
                        return;
                    };
                    if cancel.is_cancelled() {
                        tracing::trace!("Skipping {} after cancellation", entry.url);
                        return;
                    }
                    process_entry(&context, entry).await;
                });
            }

            context.report_progress();

            if batches % 10 == 0 {
                let snapshot = state.snapshot();
                let rate = snapshot.pages_processed as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!("Progress: {}, {:.2} pages/sec", snapshot, rate);
            }

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Worker task failed: {}", e);
            }
        }

        let snapshot = state.snapshot();
        tracing::info!(
            "Crawl finished in {:.2?}: {} pages scanned, {} broken, {} left unresolved",
            start_time.elapsed(),
            snapshot.pages_processed,
            snapshot.pages_broken,
            snapshot.pages_admitted.saturating_sub(snapshot.pages_processed)
        );

        Ok(state.records())
    }
}

/// Fetches one URL, records the outcome, then admits the links it carries
///
/// The outcome is recorded and reported before any link is admitted, so a
/// progress callback that cancels the crawl always sees the new links still
/// undispatched.
async fn process_entry(context: &WorkerContext, entry: FrontierEntry) {
    let url = entry.url;

    if let Err(e) = context.state.begin_fetch(&url) {
        tracing::warn!("{}", e);
        return;
    }

    let outcome = context.fetcher.fetch(&url, &context.authority).await;

    if is_broken_status(outcome.status) {
        tracing::info!(
            "Broken link {} ({}) found on {}",
            url,
            outcome.status.unwrap_or_default(),
            entry.source
        );
    } else if let Some(error) = &outcome.error {
        tracing::debug!("Fetch of {} reported: {}", url, error);
    }

    if let Err(e) = context.state.complete_fetch(&url, &outcome) {
        tracing::warn!("{}", e);
        return;
    }
    context.report_progress();

    let Some(body) = &outcome.body else {
        return;
    };
    if context.state.frontier().is_full() {
        tracing::debug!("Page cap reached, not extracting links from {}", url);
        return;
    }

    let base_url = Url::parse(&outcome.final_url).unwrap_or_else(|_| url.clone());
    let links = extract_links(body, &base_url, &context.filter);
    let found = links.len();

    let mut admitted = 0usize;
    for link in links {
        let link_type = LinkType::classify(&link, &context.authority);
        if context.state.admit(link, url.as_str(), link_type) {
            admitted += 1;
        }
    }

    tracing::debug!("{}: {} links found, {} newly admitted", url, found, admitted);
}

/// Runs a complete crawl of one site
///
/// This is the main entry point for library callers that need neither
/// progress nor cancellation.
///
/// # Example
///
/// ```no_run
/// use ripple_check::config::Config;
/// use ripple_check::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let records = run_crawl("https://example.com/", &Config::default()).await?;
/// for record in records.iter().filter(|r| r.is_broken()) {
///     println!("{} -> {:?}", record.url, record.status);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(start_url: &str, config: &Config) -> Result<Vec<CrawlRecord>, RippleError> {
    Coordinator::new(start_url, config)?.run().await
}
