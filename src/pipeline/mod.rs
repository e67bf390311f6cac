//! Request pipeline
//!
//! This module wires retrieval and extraction into the message flow:
//! - Inbound/outbound event payloads
//! - Deterministic identifiers and fingerprints
//! - The request processor
//! - Publish sinks and the line-delimited consumer

mod consumer;
mod events;
mod ids;
mod processor;
mod publisher;

pub use consumer::{ConsumerStats, RequestConsumer};
pub use events::{ParseRequest, PriceMeasured};
pub use ids::{meta_hash, new_event_id, price_measured_event_id, sha256_hex};
pub use processor::{RequestProcessor, DEFAULT_CURRENCY};
pub use publisher::{JsonLinesPublisher, Publisher};
