//! Parsing of free-text command input.

use crate::errors::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(field: &'static str, input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| Error::validation(field, "use the YYYY-MM-DD format"))
}

/// Parses a `YYYY-MM-DD HH:MM` time, read as UTC.
pub fn parse_datetime(field: &'static str, input: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(input.trim(), "%Y-%m-%d %H:%M")
        .map(|naive| naive.and_utc())
        .map_err(|_| Error::validation(field, "use the YYYY-MM-DD HH:MM format"))
}

/// Optional text input, `None` when blank.
#[must_use]
pub fn non_blank(input: Option<String>) -> Option<String> {
    input.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_date() {
        let date = parse_date("expiry date", " 2026-03-09 ").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2026, 3, 9));

        assert!(matches!(
            parse_date("expiry date", "09/03/2026"),
            Err(Error::Validation {
                field: "expiry date",
                ..
            })
        ));
        assert!(parse_date("expiry date", "2026-02-30").is_err());
    }

    #[test]
    fn test_parse_datetime() {
        let time = parse_datetime("scheduled for", "2026-03-09 14:30").unwrap();
        assert_eq!((time.hour(), time.minute()), (14, 30));
        assert!(parse_datetime("scheduled for", "2026-03-09").is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("x".to_string())), Some("x".to_string()));
    }
}
