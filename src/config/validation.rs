use crate::config::types::{Config, FetcherConfig, ProcessorConfig};
use crate::ConfigError;

/// Upper bound on configured retries
const MAX_RETRIES: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_processor_config(&config.processor)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 1, got {}",
            config.request_timeout_ms
        )));
    }

    if config.max_body_bytes < 1 {
        return Err(ConfigError::Validation(format!(
            "max_body_bytes must be >= 1, got {}",
            config.max_body_bytes
        )));
    }

    if config.retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "retries must be <= {}, got {}",
            MAX_RETRIES, config.retries
        )));
    }

    if config.min_backoff_ms > config.max_backoff_ms {
        return Err(ConfigError::Validation(format!(
            "min_backoff_ms ({}) must not exceed max_backoff_ms ({})",
            config.min_backoff_ms, config.max_backoff_ms
        )));
    }

    Ok(())
}

/// Validates processor configuration
fn validate_processor_config(config: &ProcessorConfig) -> Result<(), ConfigError> {
    validate_currency_code(&config.default_currency)
}

/// A currency code must be exactly three ASCII letters
fn validate_currency_code(code: &str) -> Result<(), ConfigError> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::Validation(format!(
            "default_currency must be a 3-letter code, got '{}'",
            code
        )));
    }
    Ok(())
}
