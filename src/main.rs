//! Ripple-Check main entry point
//!
//! This is the command-line interface for the Ripple-Check broken link crawler.

use anyhow::Context;
use clap::Parser;
use ripple_check::config::{load_config_with_hash, validate, validate_start_url, Config};
use ripple_check::crawler::Coordinator;
use ripple_check::output::{
    broken_records, default_csv_filename, export_broken_csv, print_broken_links,
    print_statistics, CrawlStatistics,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How often the progress line is logged during a crawl
const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// Ripple-Check: a broken link crawler
///
/// Ripple-Check crawls every page reachable from a start URL on the same
/// site, checks each discovered link (internal and external), and reports
/// the ones answering 404, 410, 500, 502 or 503.
#[derive(Parser, Debug)]
#[command(name = "ripple-check")]
#[command(version = "1.0.0")]
#[command(about = "A bounded-concurrency broken link crawler", long_about = None)]
struct Cli {
    /// Start URL; its host (and port) defines the crawled site
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of distinct URLs to check
    #[arg(long)]
    max_pages: Option<usize>,

    /// Number of concurrent fetch workers
    #[arg(long)]
    workers: Option<usize>,

    /// Delay between batch dispatches in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Where to write the broken link CSV
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Do not treat redirects to "/404" or "not-found" targets as broken
    #[arg(long)]
    no_soft_404: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&cli.url, &config)
    } else {
        handle_crawl(&cli, &config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_check=info,warn"),
            1 => EnvFilter::new("ripple_check=debug,info"),
            2 => EnvFilter::new("ripple_check=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if given, then applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.crawler.delay_ms = delay_ms;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.crawler.timeout_secs = timeout_secs;
    }
    if let Some(csv) = &cli.csv {
        config.output.csv_path = Some(csv.display().to_string());
    }
    if cli.no_soft_404 {
        config.redirect.not_found_markers.clear();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates input and shows what would be crawled
fn handle_dry_run(url: &str, config: &Config) -> anyhow::Result<()> {
    let start_url = validate_start_url(url)?;

    println!("=== Ripple-Check Dry Run ===\n");
    println!("Start URL: {}", start_url);

    println!("\nCrawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Workers: {}", config.crawler.workers);
    println!("  Delay between batches: {}ms", config.crawler.delay_ms);
    println!("  Request timeout: {}s", config.crawler.timeout_secs);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nFilter:");
    println!("  Skipped extensions: {}", config.filter.skip_extensions.join(" "));
    println!("  Skipped patterns: {}", config.filter.skip_patterns.join(" "));

    if config.redirect.not_found_markers.is_empty() {
        println!("\nSoft-404 detection: disabled");
    } else {
        println!(
            "\nSoft-404 markers: {}",
            config.redirect.not_found_markers.join(" ")
        );
    }

    let csv_path = config
        .output
        .csv_path
        .clone()
        .unwrap_or_else(|| default_csv_filename(&start_url));
    println!("\nReport: {}", csv_path);

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(&cli.url, config)?;
    let start_url = coordinator.start_url().clone();
    let handle = coordinator.handle();

    // Ctrl-C stops dispatching; in-flight requests finish
    let interrupt = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, waiting for in-flight requests");
            interrupt.cancel();
        }
    });

    let progress = handle.clone();
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(PROGRESS_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            tracing::info!("Progress: {}", progress.snapshot());
        }
    });

    let result = coordinator.run().await;
    ticker.abort();

    let records = match result {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if handle.is_cancelled() {
        tracing::warn!("Crawl was cancelled; results are partial");
    }

    println!();
    print_statistics(&CrawlStatistics::from_records(&records));
    println!();
    print_broken_links(&records);

    if !broken_records(&records).is_empty() {
        let csv_path = config
            .output
            .csv_path
            .clone()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(default_csv_filename(&start_url)));

        export_broken_csv(&records, &csv_path)
            .with_context(|| format!("Failed to write report to {}", csv_path.display()))?;
        println!("\n✓ Report written to: {}", csv_path.display());
    }

    Ok(())
}
