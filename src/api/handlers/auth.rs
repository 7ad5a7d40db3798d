//! Handlers for account endpoints.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
};

use crate::api::dto::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::state::AppState;

/// Registers a new account.
///
/// # Endpoint
///
/// `POST /auth/register`
///
/// # Request Body
///
/// ```json
/// { "username": "alice", "password": "secret1", "email": "alice@example.com" }
/// ```
///
/// `email` is optional.
///
/// # Response Codes
///
/// - **201 Created**: Account created, token issued
/// - **400 Bad Request**: Input failed validation
/// - **409 Conflict**: Username or email already registered
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let issued = state
        .auth_service
        .register(payload.username, payload.password, payload.email)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: issued.token,
            username: issued.username,
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// Exchanges credentials for a token.
///
/// # Endpoint
///
/// `POST /auth/login`
///
/// # Response Codes
///
/// - **200 OK**: Token issued
/// - **400 Bad Request**: Missing or malformed fields
/// - **401 Unauthorized**: Unknown user or wrong password (indistinguishable)
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let issued = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(AuthResponse {
        token: issued.token,
        username: issued.username,
        message: "Login successful".to_string(),
    }))
}

/// Reports whether the token in the `Authorization` header is currently valid.
///
/// # Endpoint
///
/// `GET /auth/validate`
///
/// The `Bearer ` prefix is optional. A missing header is simply invalid.
/// Always answers `200 OK` with `true` or `false`.
pub async fn validate_handler(State(state): State<AppState>, headers: HeaderMap) -> Json<bool> {
    let valid = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|raw| raw.strip_prefix("Bearer ").unwrap_or(raw).trim())
        .is_some_and(|token| state.auth_service.validate_token(token));

    Json(valid)
}

/// Liveness check for the account endpoints.
///
/// `GET /auth/health`
pub async fn auth_health_handler() -> &'static str {
    "Auth service is running"
}
