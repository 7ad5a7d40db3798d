//! Request validation rules.
//!
//! Each operation has a fixed, ordered list of checks. The first failing
//! check ends validation, so callers always see the most basic problem first
//! (a missing username before a short one, and so on).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;
use validator::ValidateEmail;

use crate::error::AppError;
use crate::utils::code_generator::validate_custom_code;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 6;

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("static regex"));

/// Checks for `POST /auth/register`.
///
/// Order: username present, username length, username charset, password
/// present, password length, email shape (only when non-blank).
pub fn validate_registration(
    username: &str,
    password: &str,
    email: Option<&str>,
) -> Result<(), AppError> {
    require_username(username)?;

    if !USERNAME_REGEX.is_match(username) {
        return Err(AppError::bad_request(
            "Username may only contain letters, digits, '_' or '-'",
            json!({ "field": "username" }),
        ));
    }

    require_password(password)?;

    if let Some(email) = email.filter(|e| !is_blank(e))
        && !email.validate_email()
    {
        return Err(AppError::bad_request(
            "Invalid email",
            json!({ "field": "email" }),
        ));
    }

    Ok(())
}

/// Checks for `POST /auth/login`: username present and sized, password
/// present and sized. Credentials themselves are checked by the service.
pub fn validate_login(username: &str, password: &str) -> Result<(), AppError> {
    require_username(username)?;
    require_password(password)
}

/// Checks for `POST /links`.
///
/// The original URL must use the `http` or `https` scheme and must be usable
/// as a `Location` header, so control characters and whitespace are refused.
/// A blank custom code counts as absent; any other code must pass
/// [`validate_custom_code`].
pub fn validate_link_request(original_url: &str, custom_code: Option<&str>) -> Result<(), AppError> {
    if !has_http_scheme(original_url) {
        return Err(AppError::bad_request(
            "Invalid original URL",
            json!({ "field": "url", "reason": "must start with http:// or https://" }),
        ));
    }

    if original_url.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(AppError::bad_request(
            "Invalid original URL",
            json!({ "field": "url", "reason": "must not contain whitespace or control characters" }),
        ));
    }

    if let Some(code) = custom_code.filter(|c| !is_blank(c)) {
        validate_custom_code(code)?;
    }

    Ok(())
}

/// Empty or whitespace only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn require_username(username: &str) -> Result<(), AppError> {
    if is_blank(username) {
        return Err(AppError::bad_request(
            "Username is required",
            json!({ "field": "username" }),
        ));
    }

    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(AppError::bad_request(
            "Username must be between 3 and 50 characters",
            json!({ "field": "username", "provided_length": len }),
        ));
    }

    Ok(())
}

fn require_password(password: &str) -> Result<(), AppError> {
    if is_blank(password) {
        return Err(AppError::bad_request(
            "Password is required",
            json!({ "field": "password" }),
        ));
    }

    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(AppError::bad_request(
            "Password must be at least 6 characters",
            json!({ "field": "password" }),
        ));
    }

    Ok(())
}
