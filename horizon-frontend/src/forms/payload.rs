use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use validator::{Validate, ValidationError};

/// Sign-in payload.
#[derive(Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Invalid email address")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Sign-up payload.
#[derive(Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationProfile {
    #[validate(
        length(min = 1, message = "First name is required"),
        custom(function = "within_fifty_chars")
    )]
    pub first_name: String,
    #[validate(
        length(min = 1, message = "Last name is required"),
        custom(function = "within_fifty_chars")
    )]
    pub last_name: String,
    #[validate(
        length(min = 1, message = "Address is required"),
        custom(function = "within_fifty_chars")
    )]
    pub address1: String,
    #[validate(
        length(min = 1, message = "City is required"),
        custom(function = "within_fifty_chars")
    )]
    pub city: String,
    #[validate(
        length(min = 1, message = "State is required"),
        custom(function = "state_length")
    )]
    pub state: String,
    #[validate(
        length(min = 1, message = "Postal code is required"),
        custom(function = "postal_code_format")
    )]
    pub postal_code: String,
    #[validate(
        length(min = 1, message = "Date of birth is required"),
        custom(function = "past_calendar_date")
    )]
    pub date_of_birth: String,
    #[validate(
        length(min = 1, message = "SSN is required"),
        custom(function = "ssn_digits")
    )]
    pub ssn: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Invalid email address")
    )]
    pub email: String,
    #[validate(
        length(min = 1, message = "Password is required"),
        custom(function = "password_strength")
    )]
    pub password: String,
}

impl fmt::Debug for RegistrationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationProfile")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

// Empty values are reported by the `length(min = 1)` rule; the custom rules
// below only judge non-empty input.

fn within_fifty_chars(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > 50 {
        return Err(rule("too_long", "Must be at most 50 characters"));
    }
    Ok(())
}

fn state_length(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if !value.is_empty() && !(2..=50).contains(&len) {
        return Err(rule("state_length", "State must be 2 to 50 characters"));
    }
    Ok(())
}

fn postal_code_format(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    let len = value.chars().count();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-');
    if !(3..=10).contains(&len) || !allowed {
        return Err(rule(
            "postal_code",
            "Postal code must be 3 to 10 letters, digits, spaces or dashes",
        ));
    }
    Ok(())
}

fn past_calendar_date(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| rule("date_format", "Date of birth must be a valid date (YYYY-MM-DD)"))?;
    if date > Utc::now().date_naive() {
        return Err(rule("date_future", "Date of birth cannot be in the future"));
    }
    Ok(())
}

fn ssn_digits(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    let len = value.chars().count();
    if !(4..=9).contains(&len) || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(rule("ssn", "SSN must be 4 to 9 digits"));
    }
    Ok(())
}

fn password_strength(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.chars().count() < 8 {
        return Err(rule(
            "password_length",
            "Password must be at least 8 characters",
        ));
    }
    Ok(())
}
