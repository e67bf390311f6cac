//! Fetch module for polite page retrieval
//!
//! This module contains the retrieval side of the pipeline:
//! - Per-host request spacing
//! - Backoff policy for retries
//! - The retrying, size-bounded HTTP fetcher

mod backoff;
mod fetcher;
mod limiter;

pub use backoff::{backoff_delay, capped_backoff, MAX_JITTER};
pub use fetcher::{build_http_client, RetryingFetcher, ACCEPT_LANGUAGE_VALUE, ACCEPT_VALUE};
pub use limiter::DomainLimiter;

use crate::FetchError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Result of a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// Page body, truncated to the configured byte cap
    pub body: Vec<u8>,

    /// URL that actually served the body, after redirects
    pub effective_url: String,
}

/// Retrieves page bodies for the request processor
///
/// Implementations must return `FetchError::Cancelled` promptly once `cancel`
/// fires and must not retry on cancellation.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns its body together with the effective URL
    async fn fetch(&self, url: &str, cancel: &CancellationToken)
        -> Result<FetchResult, FetchError>;
}
