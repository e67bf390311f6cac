//! Inbound and outbound event payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A request to measure the price behind `url`
///
/// Only `url` is required by the processor; the identifiers are back-filled
/// when missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseRequest {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub correlation_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub product_id: String,
    #[serde(default)]
    pub url: String,
}

impl ParseRequest {
    /// Creates a request for `url` with every other field left empty
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// A price observation published downstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceMeasured {
    pub event_id: String,
    pub occurred_at: DateTime<Utc>,
    pub correlation_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub product_id: String,
    pub price: i64,
    pub currency: String,
    pub parsed_at: DateTime<Utc>,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub meta_hash: String,
}
