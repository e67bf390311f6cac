//! URL handling module for Price-Harvest
//!
//! This module turns the loosely formatted URLs found in inbound requests into
//! fetchable absolute URLs and derives the host key used for rate limiting.

mod normalize;

// Re-export main functions
pub use normalize::{extract_host, prepare_fetch_url};
