//! Configuration module for Ripple-Check
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so the file itself is optional.
//!
//! # Example
//!
//! ```no_run
//! use ripple_check::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("ripple.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FilterConfig, OutputConfig, RedirectConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_start_url};
