//! Bearer token authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// Username of the authenticated caller, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

/// Authenticates requests using Bearer tokens from the Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Authentication Flow
///
/// 1. Extract token from `Authorization` header
/// 2. Verify signature and expiry
/// 3. Extract the username from the subject claim
/// 4. Insert [`AuthUser`] into request extensions
///
/// # Errors
///
/// Returns `401 Unauthorized` with the same generic body whether the header
/// is missing, the token is malformed, forged or expired.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| unauthorized())?;

    if !st.auth_service.validate_token(&token) {
        return Err(unauthorized());
    }

    let username = st
        .auth_service
        .extract_username(&token)
        .ok_or_else(unauthorized)?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(AuthUser(username));

    Ok(next.run(req).await)
}

fn unauthorized() -> AppError {
    AppError::unauthorized(
        "Unauthorized",
        json!({ "reason": "Missing, invalid or expired token" }),
    )
}
