//! Helpers for interpreting database constraint violations.

/// Human-readable message for a unique-constraint violation.
///
/// Constraint names follow the Postgres defaults produced by the migrations
/// (`<table>_<column>_key`).
pub fn unique_violation_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_username_key") => "Username is already taken",
        Some("users_email_key") => "Email is already registered",
        Some("links_code_key") => "Short code is already in use",
        _ => "Unique constraint violation",
    }
}

/// Returns true when the error is a unique violation on the short code column.
pub fn is_unique_violation_on_code(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some("links_code_key"))
}
