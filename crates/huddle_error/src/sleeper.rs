//! Sports data source error types.

use crate::{RetryableError, is_transient_status};

/// Sports data source error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum SleeperErrorKind {
    /// Resource does not exist (HTTP 404)
    #[display("Not found: {}", _0)]
    NotFound(String),
    /// Non-success HTTP status
    #[display("HTTP {} error from {}: {}", status_code, path, message)]
    Status {
        /// HTTP status code
        status_code: u16,
        /// Request path
        path: String,
        /// Response body excerpt
        message: String,
    },
    /// Request could not be sent or the connection dropped
    #[display("Request to {} failed: {}", path, message)]
    Request {
        /// Request path
        path: String,
        /// Transport error message
        message: String,
        /// Connection-level failure
        connection: bool,
    },
    /// Response body did not match the expected shape
    #[display("Failed to decode {}: {}", path, message)]
    Decode {
        /// Request path
        path: String,
        /// Decoder message
        message: String,
    },
    /// Week outside the regular season range
    #[display("Week {} is outside 1..=18", _0)]
    InvalidWeek(u32),
    /// No league identifier configured
    #[display("No league id configured (set SLEEPER_LEAGUE_ID or --league)")]
    MissingLeagueId,
}

impl SleeperErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            SleeperErrorKind::Status { status_code, .. } => is_transient_status(*status_code),
            SleeperErrorKind::Request { connection, .. } => *connection,
            _ => false,
        }
    }
}

/// Sports data source error with source location tracking.
///
/// # Examples
///
/// ```
/// use huddle_error::{RetryableError, SleeperError, SleeperErrorKind};
///
/// let err = SleeperError::new(SleeperErrorKind::Status {
///     status_code: 503,
///     path: "/league/1/matchups/3".to_string(),
///     message: "unavailable".to_string(),
/// });
/// assert!(err.is_retryable());
/// assert!(!SleeperError::new(SleeperErrorKind::InvalidWeek(19)).is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Sleeper Error: {} at line {} in {}", kind, line, file)]
pub struct SleeperError {
    /// The kind of error that occurred
    pub kind: SleeperErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SleeperError {
    /// Create a new SleeperError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SleeperErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// True when the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, SleeperErrorKind::NotFound(_))
    }
}

impl RetryableError for SleeperError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (4000, 2, 10)
    }
}
