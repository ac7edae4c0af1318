//! URL handling module for Ripple-Check
//!
//! This module provides URL canonicalization, site identity (authority)
//! extraction, internal/external classification and the pre-fetch filter.

mod domain;
mod filter;
mod normalize;

// Re-export main functions
pub use domain::{extract_authority, extract_domain, is_internal};
pub use filter::UrlFilter;
pub use normalize::{canonicalize, normalize_url};
