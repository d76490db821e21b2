//! Generation provider error types.

use crate::{RetryableError, is_transient_status};

/// Which of the two generation providers a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProviderKind {
    /// Research provider (Perplexity), credential `PERPLEXITY_API_KEY`
    #[display("research provider (Perplexity)")]
    Research,
    /// Writing provider (OpenAI), credential `OPENAI_API_KEY`
    #[display("writer provider (OpenAI)")]
    Writer,
}

impl ProviderKind {
    /// Environment variable holding this provider's credential.
    pub fn credential_var(&self) -> &'static str {
        match self {
            ProviderKind::Research => "PERPLEXITY_API_KEY",
            ProviderKind::Writer => "OPENAI_API_KEY",
        }
    }
}

/// Generation provider error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProviderErrorKind {
    /// Credential not configured
    #[display("{} is not set", _0)]
    MissingApiKey(&'static str),
    /// Non-success HTTP status
    #[display("HTTP {} error: {}", status_code, message)]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Response body excerpt
        message: String,
    },
    /// Request could not be sent, timed out, or the connection dropped
    #[display("Request failed: {}", message)]
    Request {
        /// Transport error message
        message: String,
        /// Connection-level or timeout failure
        connection: bool,
    },
    /// Response carried no text
    #[display("Provider returned an empty response")]
    EmptyResponse,
    /// Response body could not be parsed
    #[display("Failed to parse response: {}", _0)]
    Parse(String),
    /// Parsed output violated the expected schema
    #[display("Response violated the expected schema: {}", _0)]
    Schema(String),
}

impl ProviderErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderErrorKind::Http { status_code, .. } => is_transient_status(*status_code),
            ProviderErrorKind::Request { connection, .. } => *connection,
            _ => false,
        }
    }

    /// Get retry strategy parameters for this error type.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            ProviderErrorKind::Http { status_code: 429, .. } => (8000, 4, 60),
            _ => (4000, 4, 60),
        }
    }
}

/// Generation provider error naming the provider implicated.
///
/// # Examples
///
/// ```
/// use huddle_error::{ProviderError, ProviderErrorKind, ProviderKind};
///
/// let err = ProviderError::new(
///     ProviderKind::Research,
///     ProviderErrorKind::MissingApiKey(ProviderKind::Research.credential_var()),
/// );
/// let text = format!("{}", err);
/// assert!(text.contains("Perplexity"));
/// assert!(text.contains("PERPLEXITY_API_KEY"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error ({}): {} at line {} in {}", provider, kind, line, file)]
pub struct ProviderError {
    /// Provider that failed
    pub provider: ProviderKind,
    /// The kind of error that occurred
    pub kind: ProviderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(provider: ProviderKind, kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            provider,
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        self.kind.retry_strategy_params()
    }
}
