//! Pipeline stage error types.

use huddle_core::RecapStage;

/// Conditions that abort a recap run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RecapErrorKind {
    /// Week has no rosters or no results yet
    #[display("No data found for week {} - check if games have been played", _0)]
    NoWeekData(u32),
    /// Neither research nor synthesis produced any evidence
    #[display("Evidence set is empty")]
    EmptyEvidence,
    /// A stage's upstream call failed; carries the cause verbatim
    #[display("{}", _0)]
    Upstream(String),
}

/// Error naming the pipeline stage that failed.
///
/// # Examples
///
/// ```
/// use huddle_core::RecapStage;
/// use huddle_error::{RecapError, RecapErrorKind};
///
/// let err = RecapError::new(RecapStage::Truth, RecapErrorKind::NoWeekData(17));
/// let text = format!("{}", err);
/// assert!(text.contains("truth"));
/// assert!(text.contains("week 17"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Recap Error: stage '{}' failed: {} at line {} in {}", stage, kind, line, file)]
pub struct RecapError {
    /// Stage that failed
    pub stage: RecapStage,
    /// The specific error condition
    pub kind: RecapErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl RecapError {
    /// Create a new RecapError with automatic location tracking.
    #[track_caller]
    pub fn new(stage: RecapStage, kind: RecapErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            stage,
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Wraps any displayable failure as an upstream error for `stage`.
    #[track_caller]
    pub fn upstream(stage: RecapStage, cause: impl std::fmt::Display) -> Self {
        Self::new(stage, RecapErrorKind::Upstream(cause.to_string()))
    }
}
