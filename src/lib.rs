//! Price-Harvest: a polite product price extractor
//!
//! This crate fetches product pages under per-host rate limits with bounded
//! retries, extracts a price and currency from heterogeneous e-commerce markup,
//! and publishes a normalized "price measured" fact to a downstream sink.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod url;

use thiserror::Error;

/// Top-level error type for Price-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("empty url")]
    Empty,

    #[error("invalid url: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("invalid url scheme: {0}")]
    InvalidScheme(String),

    #[error("invalid url host")]
    MissingHost,
}

/// Errors produced by a single logical fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    InvalidUrl(#[from] UrlError),

    #[error("http error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("http status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("operation cancelled")]
    Cancelled,
}

impl FetchError {
    /// Returns true if the fetch was aborted by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns true if another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Status { .. })
    }
}

/// Errors surfaced by a publish sink
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink rejected message: {0}")]
    Rejected(String),
}

/// Errors surfaced by the request processor, tagged with the failing stage
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("empty url")]
    EmptyUrl,

    #[error("fetch: {0}")]
    Fetch(#[source] FetchError),

    #[error("price not found")]
    PriceNotFound,

    #[error("encode price_measured: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("publish: {0}")]
    Publish(#[source] PublishError),

    #[error("operation cancelled")]
    Cancelled,
}

impl ProcessError {
    /// Returns true if processing was aborted by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<FetchError> for ProcessError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Cancelled => Self::Cancelled,
            other => Self::Fetch(other),
        }
    }
}

/// Result type alias for Price-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{ExtractionResult, PriceExtractor};
pub use fetch::{DomainLimiter, FetchResult, RetryingFetcher};
pub use pipeline::{ParseRequest, PriceMeasured, RequestProcessor};
