//! Structural field policy for account flows.
//!
//! Checks are shape-only: no store lookups here. Uniqueness belongs to the
//! credential store.

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MIN_PASSWORD_CHARS: usize = 12;

/// One field-scoped policy failure, phrased for redisplaying the form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Names must be non-empty and alphabetic.
#[must_use]
pub fn name_violation(field: &'static str, value: &str) -> Option<FieldViolation> {
    if !value.is_empty() && value.chars().all(char::is_alphabetic) {
        None
    } else {
        Some(FieldViolation::new(
            field,
            "An alphabetic name is required.",
        ))
    }
}

#[must_use]
pub fn email_violation(email_normalized: &str) -> Option<FieldViolation> {
    if valid_email(email_normalized) {
        None
    } else {
        Some(FieldViolation::new(
            "email",
            "A valid email address is required.",
        ))
    }
}

/// At least 12 characters with an uppercase letter, a lowercase letter, a
/// digit, and a symbol.
#[must_use]
pub fn password_violation(password: &str) -> Option<FieldViolation> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_CHARS;
    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric());

    if long_enough && has_upper && has_lower && has_digit && has_symbol {
        None
    } else {
        Some(FieldViolation::new(
            "password",
            "Passwords need at least 12 characters, including an uppercase letter, a lowercase letter, a digit, and a symbol.",
        ))
    }
}

/// All registration checks; empty means the input passed.
#[must_use]
pub fn registration_violations(
    first_name: &str,
    last_name: &str,
    email_normalized: &str,
    password: &str,
) -> Vec<FieldViolation> {
    let mut violations = profile_violations(first_name, last_name, email_normalized);
    violations.extend(password_violation(password));
    violations
}

/// Checks shared by registration and profile update.
#[must_use]
pub fn profile_violations(
    first_name: &str,
    last_name: &str,
    email_normalized: &str,
) -> Vec<FieldViolation> {
    [
        name_violation("first_name", first_name),
        name_violation("last_name", last_name),
        email_violation(email_normalized),
    ]
    .into_iter()
    .flatten()
    .collect()
}
