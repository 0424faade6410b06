//! Minimum spacing between outbound requests
//!
//! Scryfall asks clients to keep 50-100 ms between requests. A `RateLimiter`
//! is shared by every client built with it, so all calls through it are
//! serialized no matter how many tasks issue them.

use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Default spacing between two requests
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Per-instance request throttle
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_access: Mutex<Option<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_access: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the interval since the previous call has passed, then run `call`.
    ///
    /// The lock is held for the whole call and the timestamp is taken once it
    /// completes, so at most one call is in flight.
    pub async fn run<F, Fut, T>(&self, call: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut last_access = self.last_access.lock().await;
        if let Some(previous) = *last_access {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                log::debug!("Rate limiting: waiting {:?}", wait);
                sleep(wait).await;
            }
        }
        let output = call().await;
        *last_access = Some(Instant::now());
        output
    }
}
