//! API route configuration.

use crate::api::handlers::{
    auth_health_handler, create_link_handler, delete_link_handler, login_handler,
    my_links_handler, register_handler, validate_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Account routes, mounted under `/auth`.
///
/// # Endpoints
///
/// - `POST /register` - Create an account, returns a token
/// - `POST /login`    - Exchange credentials for a token
/// - `GET  /validate` - Check the token in the `Authorization` header
/// - `GET  /health`   - Liveness text
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/validate", get(validate_handler))
        .route("/health", get(auth_health_handler))
}

/// Link management routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST   /links`      - Create a short link
/// - `GET    /my-links`   - List the caller's links
/// - `DELETE /links/{id}` - Delete one of the caller's links
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link_handler))
        .route("/my-links", get(my_links_handler))
        .route("/links/{id}", delete(delete_link_handler))
}
