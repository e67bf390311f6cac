//! Request processor - turns one parse request into one published fact
//!
//! For each request the processor:
//! - Validates the URL and back-fills missing identifiers
//! - Fetches the page
//! - Extracts price and currency
//! - Builds the outbound fact with deterministic identifiers
//! - Publishes it, keyed by product or by source URL

use crate::extract::{normalize_currency, PriceExtractor};
use crate::fetch::PageFetcher;
use crate::pipeline::events::{ParseRequest, PriceMeasured};
use crate::pipeline::ids::{meta_hash, new_event_id, price_measured_event_id, sha256_hex};
use crate::pipeline::publisher::Publisher;
use crate::ProcessError;
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Currency assumed when the page does not state one
pub const DEFAULT_CURRENCY: &str = "RUB";

/// Orchestrates fetch, extraction and publication for parse requests
pub struct RequestProcessor {
    fetcher: Arc<dyn PageFetcher>,
    extractor: PriceExtractor,
    publisher: Arc<dyn Publisher>,
    default_currency: String,
}

impl RequestProcessor {
    /// Creates a processor that defaults missing currencies to RUB
    pub fn new(fetcher: Arc<dyn PageFetcher>, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            fetcher,
            extractor: PriceExtractor::new(),
            publisher,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Overrides the currency used when extraction finds none
    pub fn with_default_currency(mut self, currency: &str) -> Self {
        let normalized = normalize_currency(currency);
        if !normalized.is_empty() {
            self.default_currency = normalized;
        }
        self
    }

    /// Handles one request
    ///
    /// On success exactly one message has been published and the published
    /// fact is returned. On failure nothing has been published.
    ///
    /// # Errors
    ///
    /// * `EmptyUrl` - The URL is blank
    /// * `Fetch` - The page could not be retrieved
    /// * `PriceNotFound` - No strategy produced a price
    /// * `Encode` / `Publish` - The fact could not be delivered
    /// * `Cancelled` - `cancel` fired during fetching
    pub async fn handle(
        &self,
        mut request: ParseRequest,
        cancel: &CancellationToken,
    ) -> Result<PriceMeasured, ProcessError> {
        request.url = request.url.trim().to_string();
        if request.url.is_empty() {
            return Err(ProcessError::EmptyUrl);
        }

        if request.event_id.is_empty() {
            request.event_id = new_event_id();
        }
        if request.correlation_id.is_empty() {
            request.correlation_id = request.event_id.clone();
        }

        let fetched = self.fetcher.fetch(&request.url, cancel).await?;

        let extracted = self.extractor.extract(&fetched.body);
        if !extracted.found {
            return Err(ProcessError::PriceNotFound);
        }

        let currency = if extracted.currency.is_empty() {
            self.default_currency.clone()
        } else {
            extracted.currency
        };

        let source_url = if fetched.effective_url.trim().is_empty() {
            request.url.clone()
        } else {
            fetched.effective_url
        };

        let parsed_at = Utc::now();
        let fact = PriceMeasured {
            event_id: price_measured_event_id(&request.event_id),
            occurred_at: parsed_at,
            correlation_id: request.correlation_id,
            product_id: request.product_id,
            price: extracted.price,
            currency: currency.clone(),
            parsed_at,
            meta_hash: meta_hash(&source_url, extracted.price, &currency),
            source_url,
        };

        let payload = serde_json::to_vec(&fact)?;

        let key = if fact.product_id.is_empty() {
            sha256_hex(&fact.source_url)
        } else {
            fact.product_id.clone()
        };

        self.publisher
            .publish(&key, &payload)
            .await
            .map_err(ProcessError::Publish)?;

        tracing::info!(
            product_id = %fact.product_id,
            price = fact.price,
            currency = %fact.currency,
            url = %fact.source_url,
            correlation_id = %fact.correlation_id,
            "price measured published"
        );

        Ok(fact)
    }
}
