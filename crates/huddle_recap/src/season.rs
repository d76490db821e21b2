//! Season inference from the wall clock.

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use huddle_error::ConfigError;

/// NFL season a calendar date belongs to.
///
/// January and February close out the previous year's season.
///
/// ```
/// use chrono::NaiveDate;
/// use huddle_recap::season_for_date;
///
/// let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
/// assert_eq!(season_for_date(date(2025, 1, 12)), 2024);
/// assert_eq!(season_for_date(date(2025, 2, 28)), 2024);
/// assert_eq!(season_for_date(date(2025, 3, 1)), 2025);
/// assert_eq!(season_for_date(date(2025, 12, 31)), 2025);
/// ```
pub fn season_for_date(date: NaiveDate) -> i32 {
    match date.month() {
        1 | 2 => date.year() - 1,
        _ => date.year(),
    }
}

/// Parses an IANA timezone name.
///
/// # Errors
///
/// Returns a `ConfigError` naming the unknown zone.
pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| ConfigError::new(format!("Unknown timezone '{}': {}", name, e)))
}

/// Season in progress right now in `timezone`.
///
/// # Errors
///
/// Returns a `ConfigError` if the timezone is unknown.
pub fn current_season(timezone: &str) -> Result<i32, ConfigError> {
    let tz = parse_timezone(timezone)?;
    Ok(season_for_date(Utc::now().with_timezone(&tz).date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_zones_parse() {
        assert!(parse_timezone("America/New_York").is_ok());
        assert!(parse_timezone(" Europe/London ").is_ok());
    }

    #[test]
    fn unknown_zone_is_config_error() {
        let err = parse_timezone("Mars/Olympus_Mons").unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
        assert!(current_season("Nowhere").is_err());
    }
}
