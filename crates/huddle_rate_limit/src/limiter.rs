//! Minimum-interval request pacing on top of governor.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

// Type alias for our direct rate limiter
type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Spaces requests to one provider at least `interval` apart.
///
/// Uses a GCRA quota of one cell per interval with a burst of one, so the
/// first request goes out immediately and each later request waits until
/// the interval has elapsed since the previous one. Clones share state.
///
/// # Example
///
/// ```
/// use huddle_rate_limit::MinIntervalLimiter;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let limiter = MinIntervalLimiter::new(Duration::from_millis(10));
/// limiter.acquire().await; // immediate
/// limiter.acquire().await; // waits ~10ms
/// # }
/// ```
#[derive(Clone)]
pub struct MinIntervalLimiter {
    interval: Duration,
    limiter: Option<Arc<DirectRateLimiter>>,
}

impl MinIntervalLimiter {
    /// Create a limiter; a zero interval disables pacing.
    pub fn new(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval)
            .map(|quota| Arc::new(GovernorRateLimiter::direct(quota.allow_burst(NonZeroU32::MIN))));
        Self { interval, limiter }
    }

    /// Create a limiter from a millisecond interval.
    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Configured spacing.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next request may be sent.
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            trace!(interval_ms = self.interval.as_millis() as u64, "Waiting for request slot");
            limiter.until_ready().await;
        }
    }
}

impl std::fmt::Debug for MinIntervalLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinIntervalLimiter")
            .field("interval", &self.interval)
            .field("enabled", &self.limiter.is_some())
            .finish()
    }
}
