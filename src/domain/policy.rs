//! Credential input rules: email format and password strength.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{MIN_PASSWORD_LENGTH, PASSWORD_SYMBOLS};
use crate::errors::{AppError, AppResult};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    // ASCII word characters only; `\w` in `regex` would admit Unicode letters
    Regex::new(r"^[A-Za-z0-9_.-]+@([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]{2,4}$")
        .expect("email pattern compiles")
});

pub const PASSWORD_POLICY_MESSAGE: &str = "Password must contain at least one uppercase letter, \
one lowercase letter, one number, and one special character, and be at least 8 characters long";

/// Check an email address against the accepted address pattern.
pub fn validate_email(email: &str) -> AppResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(AppError::validation("Invalid Email"))
    }
}

/// Check a plaintext password against the password policy.
///
/// At least 8 characters, only ASCII letters, digits and `@$!%*?&`,
/// with one of each class present.
pub fn validate_password(password: &str) -> AppResult<()> {
    let is_symbol = |c: char| PASSWORD_SYMBOLS.contains(c);

    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || is_symbol(c));
    let long_enough = password.chars().count() >= MIN_PASSWORD_LENGTH;

    if allowed
        && long_enough
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(is_symbol)
    {
        Ok(())
    } else {
        Err(AppError::validation(PASSWORD_POLICY_MESSAGE))
    }
}
