//! Integration tests for Price-Harvest
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! fetcher, the processor and the consumer end-to-end.

mod consumer_tests;
mod pipeline_tests;
mod support;
