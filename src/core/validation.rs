//! Form validation - card details, contact fields and credentials.
//!
//! Every validator returns the normalized value on success so callers store
//! exactly what was checked. Failures are `Error::Validation` naming the field.

use crate::errors::{Error, Result};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

// Patterns are literals; compiling them cannot fail.
#[allow(clippy::expect_used)]
static CARD_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{16}$").expect("valid regex"));
#[allow(clippy::expect_used)]
static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{2})$").expect("valid regex"));
#[allow(clippy::expect_used)]
static CVV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("valid regex"));
#[allow(clippy::expect_used)]
static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("valid regex"));
#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("valid regex")
});

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

fn strip_separators(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Validates a 16-digit card number. Spaces and hyphens are ignored.
pub fn validate_card_number(input: &str) -> Result<String> {
    let digits = strip_separators(input);
    if !CARD_NUMBER_RE.is_match(&digits) {
        return Err(Error::validation(
            "card number",
            "must be exactly 16 digits",
        ));
    }
    Ok(digits)
}

/// Validates an `MM/YY` expiry date that is not before `today`'s month.
///
/// Returns the `(month, year)` pair with a four-digit year.
pub fn validate_expiry(input: &str, today: NaiveDate) -> Result<(u32, i32)> {
    let trimmed = input.trim();
    let captures = EXPIRY_RE
        .captures(trimmed)
        .ok_or_else(|| Error::validation("expiry date", "must be in MM/YY format"))?;

    let month: u32 = captures[1]
        .parse()
        .map_err(|_| Error::validation("expiry date", "invalid month"))?;
    let year: i32 = captures[2]
        .parse::<i32>()
        .map_err(|_| Error::validation("expiry date", "invalid year"))?
        + 2000;

    if (year, month) < (today.year(), today.month()) {
        return Err(Error::validation("expiry date", "card has expired"));
    }

    Ok((month, year))
}

/// Validates a 3 or 4 digit security code.
pub fn validate_cvv(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if !CVV_RE.is_match(trimmed) {
        return Err(Error::validation("CVV", "must be 3 or 4 digits"));
    }
    Ok(trimmed.to_string())
}

/// Validates a mobile number: optional leading `+` then 10 to 15 digits.
/// Spaces and hyphens are ignored.
pub fn validate_mobile(input: &str) -> Result<String> {
    let normalized = strip_separators(input);
    if !MOBILE_RE.is_match(&normalized) {
        return Err(Error::validation(
            "mobile number",
            "must be 10 to 15 digits, optionally starting with +",
        ));
    }
    Ok(normalized)
}

/// Validates an email address and lowercases it.
pub fn validate_email(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if !EMAIL_RE.is_match(trimmed) {
        return Err(Error::validation("email", "is not a valid address"));
    }
    Ok(trimmed.to_lowercase())
}

pub fn validate_password(input: &str) -> Result<()> {
    if input.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

/// Rejects blank input and returns it trimmed.
pub fn validate_required(field: &'static str, input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Masks all but the last four digits: `**** **** **** 1234`.
#[must_use]
pub fn mask_card_number(digits: &str) -> String {
    format!("**** **** **** {}", last_four(digits))
}

/// Last four characters of a card number (fewer if the input is shorter).
#[must_use]
pub fn last_four(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let start = chars.len().saturating_sub(4);
    chars[start..].iter().collect()
}

/// Card details as typed into a payment form.
#[derive(Debug, Clone)]
pub struct CardDetails {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
    pub holder: String,
}

/// Card details that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCard {
    /// 16 normalized digits
    pub number: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub holder: String,
}

impl CardDetails {
    /// Validates every field of the form, reporting the first failure.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidCard> {
        let number = validate_card_number(&self.number)?;
        let (expiry_month, expiry_year) = validate_expiry(&self.expiry, today)?;
        validate_cvv(&self.cvv)?;
        let holder = validate_required("card holder", &self.holder)?;
        Ok(ValidCard {
            number,
            expiry_month,
            expiry_year,
            holder,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    #[test]
    fn test_card_number_accepts_sixteen_digits_with_separators() {
        assert_eq!(
            validate_card_number("4111 1111-1111 1111").unwrap(),
            "4111111111111111"
        );
    }

    #[test]
    fn test_card_number_rejects_fifteen_digits() {
        let result = validate_card_number("411111111111111");
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "card number",
                ..
            })
        ));
    }

    #[test]
    fn test_card_number_rejects_letters() {
        assert!(validate_card_number("4111 1111 1111 111a").is_err());
    }

    #[test]
    fn test_expiry_format_and_range() {
        assert_eq!(validate_expiry("06/26", today()).unwrap(), (6, 2026));
        assert_eq!(validate_expiry("01/30", today()).unwrap(), (1, 2030));
        assert!(validate_expiry("05/26", today()).is_err());
        assert!(validate_expiry("13/27", today()).is_err());
        assert!(validate_expiry("6/27", today()).is_err());
        assert!(validate_expiry("06/2027", today()).is_err());
    }

    #[test]
    fn test_cvv() {
        assert!(validate_cvv("123").is_ok());
        assert!(validate_cvv("1234").is_ok());
        assert!(validate_cvv("12").is_err());
        assert!(validate_cvv("12345").is_err());
        assert!(validate_cvv("12a").is_err());
    }

    #[test]
    fn test_mobile() {
        assert_eq!(validate_mobile("+20 100 123 4567").unwrap(), "+201001234567");
        assert_eq!(validate_mobile("0100-123-4567").unwrap(), "01001234567");
        assert!(validate_mobile("12345").is_err());
        assert!(validate_mobile("++201001234567").is_err());
        assert!(validate_mobile("0100123456a").is_err());
    }

    #[test]
    fn test_email_is_lowercased() {
        assert_eq!(
            validate_email("  Donor@Example.ORG ").unwrap(),
            "donor@example.org"
        );
        assert!(validate_email("no-at-sign.example.org").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_password_and_required() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
        assert_eq!(validate_required("name", "  Soup Kitchen ").unwrap(), "Soup Kitchen");
        assert!(validate_required("name", "   ").is_err());
    }

    #[test]
    fn test_mask_card_number() {
        assert_eq!(mask_card_number("4111111111111234"), "**** **** **** 1234");
        assert_eq!(last_four("12"), "12");
    }

    #[test]
    fn test_card_details_reports_first_failure() {
        let card = CardDetails {
            number: "4111111111111111".to_string(),
            expiry: "12/20".to_string(),
            cvv: "123".to_string(),
            holder: "A Donor".to_string(),
        };
        assert!(matches!(
            card.validate(today()),
            Err(Error::Validation {
                field: "expiry date",
                ..
            })
        ));
    }
}
