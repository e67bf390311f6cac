//! Configuration for Price-Harvest
//!
//! Settings live in a TOML file with a `[fetcher]` and a `[processor]` table.
//! Every key is optional; omitted keys take the production defaults and the
//! merged result is validated before use.
//!
//! ```no_run
//! use price_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("up to {} retries per page", config.fetcher.retries);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::{content_hash, load_config, load_config_with_hash, parse_config};
pub use types::{Config, FetcherConfig, ProcessorConfig};
