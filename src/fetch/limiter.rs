//! Per-host request spacing
//!
//! The limiter keeps, for every host it has seen, the earliest instant at which
//! the next request to that host may start. Reservations are made under a short
//! critical section and the caller sleeps outside of it, so concurrent callers
//! for one host queue up behind each other while other hosts are unaffected.

use crate::FetchError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Table size above which stale reservations are dropped
const PRUNE_THRESHOLD: usize = 4096;

#[derive(Debug)]
struct Reservations {
    /// Host -> earliest start of the next request
    slots: HashMap<String, Instant>,

    /// Table size that triggers the next prune
    prune_at: usize,
}

/// Enforces a minimum interval between requests to the same host
#[derive(Debug)]
pub struct DomainLimiter {
    /// Minimum time between two request starts for one host
    min_interval: Duration,

    reservations: Mutex<Reservations>,
}

impl DomainLimiter {
    /// Creates a limiter with the given per-host spacing
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            reservations: Mutex::new(Reservations {
                slots: HashMap::new(),
                prune_at: PRUNE_THRESHOLD,
            }),
        }
    }

    /// Returns the configured per-host spacing
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until a request to `host` may start
    ///
    /// The slot is reserved before sleeping, so a later caller for the same
    /// host is spaced after this one even while this one is still asleep.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The caller may issue its request now
    /// * `Err(FetchError::Cancelled)` - `cancel` fired before the slot was reached
    pub async fn wait(&self, host: &str, cancel: &CancellationToken) -> Result<(), FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let wait = self.reserve(host, Instant::now());
        if wait.is_zero() {
            return Ok(());
        }

        tracing::trace!("Delaying request to {} by {:?}", host, wait);

        tokio::select! {
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            _ = tokio::time::sleep(wait) => Ok(()),
        }
    }

    /// Reserves the next slot for `host` and returns how long to wait for it
    fn reserve(&self, host: &str, now: Instant) -> Duration {
        let mut reservations = match self.reservations.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if reservations.slots.len() > reservations.prune_at {
            let min_interval = self.min_interval;
            reservations
                .slots
                .retain(|_, reserved| now.saturating_duration_since(*reserved) < min_interval);
            // Survivors are all fresh; rescan only once the table has doubled
            reservations.prune_at = PRUNE_THRESHOLD.max(reservations.slots.len() * 2);
        }

        let wait = match reservations.slots.get(host) {
            Some(&last) => (last + self.min_interval).saturating_duration_since(now),
            None => Duration::ZERO,
        };

        reservations.slots.insert(host.to_string(), now + wait);
        wait
    }

    /// Number of hosts currently tracked
    pub fn tracked_hosts(&self) -> usize {
        match self.reservations.lock() {
            Ok(guard) => guard.slots.len(),
            Err(poisoned) => poisoned.into_inner().slots.len(),
        }
    }
}
