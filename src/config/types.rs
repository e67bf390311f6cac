use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Price-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
}

/// HTTP fetcher behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for a single HTTP attempt (milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Hard cap on the number of response body bytes kept in memory
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,

    /// Number of retries after the first attempt
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Base delay of the exponential backoff (milliseconds)
    #[serde(default = "default_min_backoff_ms")]
    pub min_backoff_ms: u64,

    /// Cap on the exponential part of the backoff (milliseconds)
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Minimum time between requests to the same host (milliseconds)
    #[serde(default = "default_per_domain_min_interval_ms")]
    pub per_domain_min_interval_ms: u64,
}

impl FetcherConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn min_backoff(&self) -> Duration {
        Duration::from_millis(self.min_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    pub fn per_domain_min_interval(&self) -> Duration {
        Duration::from_millis(self.per_domain_min_interval_ms)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_ms: default_request_timeout_ms(),
            max_body_bytes: default_max_body_bytes(),
            retries: default_retries(),
            min_backoff_ms: default_min_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            per_domain_min_interval_ms: default_per_domain_min_interval_ms(),
        }
    }
}

/// Request processor configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProcessorConfig {
    /// Currency assigned when extraction finds a price but no currency
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
        }
    }
}

fn default_user_agent() -> String {
    "price-tracker-parsing/1.0".to_string()
}

fn default_request_timeout_ms() -> u64 {
    8_000
}

fn default_max_body_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_retries() -> u32 {
    3
}

fn default_min_backoff_ms() -> u64 {
    200
}

fn default_max_backoff_ms() -> u64 {
    2_000
}

fn default_per_domain_min_interval_ms() -> u64 {
    300
}

fn default_currency() -> String {
    "RUB".to_string()
}
