//! Local form validation. Nothing here touches the network.

use crate::error::{AdminError, Result};

pub const PHONE_DIGITS: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneHint {
    Empty,
    /// Some digits typed, not yet eleven.
    Partial,
    Valid,
    /// More than eleven digits.
    Invalid,
}

/// Keep only ASCII digits.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Accepts exactly eleven digits after stripping everything else.
pub fn validate_phone(raw: &str) -> Result<String> {
    let phone = digits_only(raw);
    let len = phone.len();
    if len == PHONE_DIGITS {
        return Ok(phone);
    }
    let message = if len == 0 {
        "Enter an 11-digit phone number".to_owned()
    } else if len < PHONE_DIGITS {
        format!("Too few digits in phone number: got {len}, need {PHONE_DIGITS}")
    } else {
        format!("Too many digits in phone number: got {len}, need {PHONE_DIGITS}")
    };
    Err(AdminError::Validation(message))
}

/// Live hint for the phone input while the user types.
pub fn phone_hint(raw: &str) -> PhoneHint {
    match digits_only(raw).len() {
        0 => PhoneHint::Empty,
        PHONE_DIGITS => PhoneHint::Valid,
        n if n < PHONE_DIGITS => PhoneHint::Partial,
        _ => PhoneHint::Invalid,
    }
}

/// The balance must be a finite number. Returns the trimmed text as typed.
pub fn validate_balance(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(trimmed.to_owned()),
        _ => Err(AdminError::Validation("Enter a valid balance amount".to_owned())),
    }
}

pub fn require(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AdminError::Validation(message.to_owned()));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: AdminError) -> String {
        match err {
            AdminError::Validation(m) => m,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn phone_requires_exactly_eleven_digits() {
        assert_eq!(validate_phone("138-0000-0000").unwrap(), "13800000000");
        assert_eq!(validate_phone(" 13800000000 ").unwrap(), "13800000000");

        let short = message(validate_phone("1234567890").unwrap_err());
        assert!(short.contains("Too few digits"), "{short}");
        assert!(short.contains("got 10"));

        let long = message(validate_phone("123456789012").unwrap_err());
        assert!(long.contains("Too many digits"));

        let empty = message(validate_phone("abc").unwrap_err());
        assert_eq!(empty, "Enter an 11-digit phone number");
    }

    #[test]
    fn every_length_but_eleven_is_rejected() {
        for len in 0..20 {
            let raw: String = "9".repeat(len);
            assert_eq!(validate_phone(&raw).is_ok(), len == PHONE_DIGITS, "len {len}");
        }
    }

    #[test]
    fn hints_follow_digit_count() {
        assert_eq!(phone_hint(""), PhoneHint::Empty);
        assert_eq!(phone_hint("138"), PhoneHint::Partial);
        assert_eq!(phone_hint("13800000000"), PhoneHint::Valid);
        assert_eq!(phone_hint("138000000001"), PhoneHint::Invalid);
    }

    #[test]
    fn balance_must_be_finite_number() {
        assert_eq!(validate_balance(" 12.50 ").unwrap(), "12.50");
        assert_eq!(validate_balance("-3").unwrap(), "-3");
        assert!(validate_balance("").is_err());
        assert!(validate_balance("abc").is_err());
        assert!(validate_balance("inf").is_err());
        assert!(validate_balance("NaN").is_err());
    }
}
