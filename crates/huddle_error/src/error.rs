//! Top-level error wrapper types.

use crate::{
    CacheError, ConfigError, JsonError, ProviderError, ProviderKind, RecapError,
    RetryableError, SleeperError,
};

/// Every domain error the workspace can raise.
///
/// # Examples
///
/// ```
/// use huddle_error::{HuddleError, JsonError};
///
/// let err: HuddleError = JsonError::new("trailing characters").into();
/// assert!(format!("{}", err).contains("trailing characters"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum HuddleErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Sports data source error
    #[from(SleeperError)]
    Sleeper(SleeperError),
    /// Generation provider error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Artifact cache error
    #[from(CacheError)]
    Cache(CacheError),
    /// Pipeline stage error
    #[from(RecapError)]
    Recap(RecapError),
}

/// Huddle error with kind discrimination.
///
/// # Examples
///
/// ```
/// use huddle_error::{HuddleResult, ConfigError};
///
/// fn might_fail() -> HuddleResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Huddle Error: {}", _0)]
pub struct HuddleError(Box<HuddleErrorKind>);

impl HuddleError {
    /// Create a new error from a kind.
    pub fn new(kind: HuddleErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &HuddleErrorKind {
        &self.0
    }

    /// True when the sports source reported a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), HuddleErrorKind::Sleeper(e) if e.is_not_found())
    }

    /// Generation provider implicated in this error, if any.
    pub fn provider(&self) -> Option<ProviderKind> {
        match self.kind() {
            HuddleErrorKind::Provider(e) => Some(e.provider),
            _ => None,
        }
    }
}

impl RetryableError for HuddleError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            HuddleErrorKind::Sleeper(e) => e.is_retryable(),
            HuddleErrorKind::Provider(e) => e.is_retryable(),
            _ => false,
        }
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self.kind() {
            HuddleErrorKind::Sleeper(e) => e.retry_strategy_params(),
            HuddleErrorKind::Provider(e) => e.retry_strategy_params(),
            _ => (4000, 4, 60),
        }
    }
}

// Generic From implementation for any type that converts to HuddleErrorKind
impl<T> From<T> for HuddleError
where
    T: Into<HuddleErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for huddle operations.
pub type HuddleResult<T> = std::result::Result<T, HuddleError>;
