//! Shared test fixtures

use async_trait::async_trait;
use price_harvest::config::FetcherConfig;
use price_harvest::pipeline::{PriceMeasured, Publisher};
use price_harvest::PublishError;
use std::sync::Mutex;

/// Creates a fetcher configuration with short delays for testing
pub fn create_test_config() -> FetcherConfig {
    FetcherConfig {
        user_agent: "TestHarvester/1.0".to_string(),
        request_timeout_ms: 2_000,
        max_body_bytes: 64 * 1024,
        retries: 2,
        min_backoff_ms: 10,
        max_backoff_ms: 40,
        per_domain_min_interval_ms: 1,
    }
}

/// Publisher that keeps every message in memory
#[derive(Default)]
pub struct RecordingPublisher {
    messages: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingPublisher {
    pub fn messages(&self) -> Vec<(String, PriceMeasured)> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(key, payload)| {
                let fact = serde_json::from_slice(payload).expect("payload is a PriceMeasured");
                (key.clone(), fact)
            })
            .collect()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, key: &str, payload: &[u8]) -> Result<(), PublishError> {
        self.messages
            .lock()
            .unwrap()
            .push((key.to_string(), payload.to_vec()));
        Ok(())
    }
}

/// Wraps `head` markup in a minimal product page
pub fn product_page(head: &str) -> String {
    format!(
        "<html><head><title>Product</title>{}</head><body><h1>Product</h1></body></html>",
        head
    )
}
