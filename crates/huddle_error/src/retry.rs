//! Retry classification shared by every network client.

/// HTTP statuses worth retrying: throttling and server or gateway failures.
///
/// # Examples
///
/// ```
/// use huddle_error::is_transient_status;
///
/// assert!(is_transient_status(429));
/// assert!(is_transient_status(503));
/// assert!(!is_transient_status(404));
/// assert!(!is_transient_status(408));
/// ```
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Trait for errors that support retry logic.
///
/// Transient errors like 503 (service unavailable), 429 (rate limit) or a
/// dropped connection return true from [`is_retryable`](Self::is_retryable).
/// Permanent errors like 401 (unauthorized) or 400 (bad request) return false
/// and fail on the first attempt.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;

    /// Get retry strategy parameters for this error.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (4000, 4, 60)
    }
}
