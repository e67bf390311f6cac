//! Identifier and fingerprint helpers
//!
//! Everything derived from request content is a pure SHA-256 function of its
//! input so republishing the same request yields identical identities.

use sha2::{Digest, Sha256};

/// Prefix mixed into outbound event ids
const PRICE_MEASURED_PREFIX: &str = "PriceMeasured|";

/// Hex-encoded SHA-256 of `input`
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Fresh random identifier for requests that arrive without one
pub fn new_event_id() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

/// Outbound event id derived from the inbound request id
pub fn price_measured_event_id(request_event_id: &str) -> String {
    sha256_hex(&format!("{}{}", PRICE_MEASURED_PREFIX, request_event_id))
}

/// Change-detection fingerprint over source, price and currency
pub fn meta_hash(source_url: &str, price: i64, currency: &str) -> String {
    sha256_hex(&format!("{}|{}|{}", source_url, price, currency))
}
