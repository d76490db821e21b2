//! Bounded exponential-backoff retry for transient failures.

use huddle_error::RetryableError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

/// Retry schedule for one provider.
///
/// Delays grow as `backoff_factor_ms * backoff_base^n`, capped at
/// `max_delay_secs`. With the defaults (base 2, factor 2000ms) the waits are
/// 4s, 8s, 16s, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Exponent base
    pub backoff_base: u64,
    /// Multiplier in milliseconds
    pub backoff_factor_ms: u64,
    /// Delay cap in seconds
    pub max_delay_secs: u64,
    /// Randomize each delay
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            backoff_base: 2,
            backoff_factor_ms: 2000,
            max_delay_secs: 60,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Sleeper API schedule: three attempts, 4s to 10s apart.
    pub fn sleeper() -> Self {
        Self {
            max_retries: 2,
            max_delay_secs: 10,
            ..Self::default()
        }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Retries with no delay between attempts.
    pub fn immediate(max_retries: usize) -> Self {
        Self {
            max_retries,
            backoff_factor_ms: 0,
            jitter: false,
            ..Self::default()
        }
    }

    /// The waits between attempts, in order.
    pub fn delays(&self) -> Vec<Duration> {
        let use_jitter = self.jitter;
        ExponentialBackoff::from_millis(self.backoff_base.max(1))
            .factor(self.backoff_factor_ms)
            .max_delay(Duration::from_secs(self.max_delay_secs))
            .map(|delay| if use_jitter { jitter(delay) } else { delay })
            .take(self.max_retries)
            .collect()
    }

    /// Run `op`, retrying while it fails with a retryable error.
    ///
    /// Permanent errors are returned after the first attempt. When retries
    /// run out, the last transient error is returned.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError + Display,
    {
        let mut attempt = 0usize;
        let max_attempts = self.max_retries + 1;
        Retry::spawn(self.delays(), || {
            attempt += 1;
            let current = attempt;
            let fut = op();
            async move {
                match fut.await {
                    Ok(value) => {
                        if current > 1 {
                            debug!(label, attempt = current, "Succeeded after retry");
                        }
                        Ok(value)
                    }
                    Err(e) if e.is_retryable() => {
                        warn!(
                            label,
                            attempt = current,
                            max_attempts,
                            error = %e,
                            "Transient failure, will retry"
                        );
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                    Err(e) => {
                        warn!(label, error = %e, "Permanent failure, failing immediately");
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await
    }
}
