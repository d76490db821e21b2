//! Week numbering shared by every data source.

use huddle_error::{SleeperError, SleeperErrorKind};

/// First regular-season week.
pub const FIRST_WEEK: u32 = 1;
/// Last week the sports source serves results for.
pub const LAST_WEEK: u32 = 18;

/// Rejects weeks outside `1..=18` before any request is made.
///
/// ```
/// use huddle_interface::validate_week;
///
/// assert!(validate_week(1).is_ok());
/// assert!(validate_week(18).is_ok());
/// assert!(validate_week(0).is_err());
/// assert!(validate_week(19).is_err());
/// ```
pub fn validate_week(week: u32) -> Result<u32, SleeperError> {
    if (FIRST_WEEK..=LAST_WEEK).contains(&week) {
        Ok(week)
    } else {
        Err(SleeperError::new(SleeperErrorKind::InvalidWeek(week)))
    }
}
