//! HTTP fetcher implementation
//!
//! This module performs one logical page fetch, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - Per-host politeness via [`DomainLimiter`]
//! - Retries with capped exponential backoff and jitter
//! - Streaming the body through a hard byte cap
//! - Reporting the effective URL after redirects
//!
//! Every suspension point (limiter wait, request, body read, backoff sleep)
//! races the caller's cancellation token.

use crate::config::FetcherConfig;
use crate::fetch::backoff::backoff_delay;
use crate::fetch::limiter::DomainLimiter;
use crate::fetch::{FetchResult, PageFetcher};
use crate::url::{extract_host, prepare_fetch_url};
use crate::{FetchError, UrlError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client, Response};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Accept header sent with every page request
pub const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Accept-Language header sent with every page request
pub const ACCEPT_LANGUAGE_VALUE: &str = "ru-RU,ru;q=0.9,en;q=0.5";

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// Upper bound on the TCP/TLS connect phase
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let timeout = config.request_timeout();

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(timeout.min(CONNECT_TIMEOUT))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages politely, retrying transient failures
pub struct RetryingFetcher {
    config: FetcherConfig,
    client: Client,
    limiter: Arc<DomainLimiter>,
}

impl RetryingFetcher {
    /// Creates a fetcher with its own per-host limiter
    pub fn new(config: FetcherConfig) -> Result<Self, reqwest::Error> {
        let limiter = Arc::new(DomainLimiter::new(config.per_domain_min_interval()));
        Self::with_limiter(config, limiter)
    }

    /// Creates a fetcher that shares an existing limiter
    pub fn with_limiter(
        config: FetcherConfig,
        limiter: Arc<DomainLimiter>,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config)?;
        Ok(Self {
            config,
            client,
            limiter,
        })
    }

    /// Returns the limiter used by this fetcher
    pub fn limiter(&self) -> &Arc<DomainLimiter> {
        &self.limiter
    }

    /// Fetches a URL with rate limiting, retries and a bounded body
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Empty / unparseable URL, bad scheme, no host | Immediate error, no request |
    /// | Network error, timeout | Retry after backoff |
    /// | Non-2xx status | Retry after backoff |
    /// | Cancellation | Immediate `Cancelled` |
    ///
    /// At most `retries + 1` attempts are made. The last error is returned once
    /// they are exhausted.
    pub async fn fetch(
        &self,
        raw_url: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchResult, FetchError> {
        let url = prepare_fetch_url(raw_url)?;
        let host = extract_host(&url).ok_or(UrlError::MissingHost)?;

        let mut attempt: u32 = 0;
        loop {
            self.limiter.wait(&host, cancel).await?;

            tracing::debug!("Fetching {} (attempt {})", url, attempt + 1);

            let err = match self.fetch_once(&url, cancel).await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            if attempt >= self.config.retries {
                tracing::debug!("Giving up on {} after {} attempts", url, attempt + 1);
                return Err(err);
            }

            let delay = backoff_delay(
                attempt,
                self.config.min_backoff(),
                self.config.max_backoff(),
            );
            tracing::warn!(
                "Attempt {} for {} failed: {}; retrying in {:?}",
                attempt + 1,
                url,
                err,
                delay
            );

            tokio::select! {
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }

            attempt += 1;
        }
    }

    /// Issues a single GET and reads the body through the byte cap
    async fn fetch_once(
        &self,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Result<FetchResult, FetchError> {
        let request = self
            .client
            .get(url.clone())
            .header(ACCEPT, ACCEPT_VALUE)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE);

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            result = request.send() => result.map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let effective_url = response.url().to_string();
        let cap = usize::try_from(self.config.max_body_bytes).unwrap_or(usize::MAX);
        let body = read_capped_body(response, cap, cancel)
            .await
            .map_err(|e| match e {
                BodyError::Cancelled => FetchError::Cancelled,
                BodyError::Http(source) => FetchError::Http {
                    url: url.to_string(),
                    source,
                },
            })?;

        Ok(FetchResult {
            body,
            effective_url,
        })
    }
}

#[async_trait]
impl PageFetcher for RetryingFetcher {
    async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchResult, FetchError> {
        RetryingFetcher::fetch(self, url, cancel).await
    }
}

enum BodyError {
    Cancelled,
    Http(reqwest::Error),
}

/// Reads at most `cap` bytes of the response body
///
/// Chunks are consumed until the cap is reached; the rest of the body is never
/// read and the connection is dropped with the response.
async fn read_capped_body(
    mut response: Response,
    cap: usize,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, BodyError> {
    let expected = response
        .content_length()
        .and_then(|len| usize::try_from(len).ok())
        .unwrap_or(0);
    let mut body = Vec::with_capacity(expected.min(cap));

    while body.len() < cap {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => return Err(BodyError::Cancelled),
            chunk = response.chunk() => chunk.map_err(BodyError::Http)?,
        };

        let Some(chunk) = chunk else {
            break;
        };

        let remaining = cap - body.len();
        let take = chunk.len().min(remaining);
        body.extend_from_slice(&chunk[..take]);
    }

    Ok(body)
}
