//! Retry delay policy
//!
//! Delays grow exponentially from `min` and are capped at `max`. A uniform
//! jitter of up to [`MAX_JITTER`] is added on top of the capped value.

use rand::Rng;
use std::time::Duration;

/// Upper bound (exclusive) of the additive jitter
pub const MAX_JITTER: Duration = Duration::from_millis(120);

/// Largest exponent applied to the base delay
const MAX_EXPONENT: u32 = 20;

/// Returns the exponential part of the delay before retry `attempt`, without jitter
///
/// `attempt` is zero-based: the delay after the first failed attempt is `min`.
pub fn capped_backoff(attempt: u32, min: Duration, max: Duration) -> Duration {
    let factor = 1u32 << attempt.min(MAX_EXPONENT);
    min.saturating_mul(factor).min(max)
}

/// Returns the full delay before retry `attempt`: the capped exponential part plus jitter
pub fn backoff_delay(attempt: u32, min: Duration, max: Duration) -> Duration {
    let jitter_ms = rand::thread_rng().gen_range(0..MAX_JITTER.as_millis() as u64);
    capped_backoff(attempt, min, max) + Duration::from_millis(jitter_ms)
}
