//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `/auth/*`            - Registration, login, token check (public)
//! - `POST /links`, `GET /my-links`, `DELETE /links/{id}` - Bearer token required
//! - `GET  /health`       - Storage health check (public)
//! - `GET  /{code}`       - Short link redirect (public)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket, stricter on `/auth`
//! - **Authentication** - Bearer token on link management routes
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// The production router: all routes, per-IP rate limits, trailing-slash
/// normalization.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()`; the
/// rate limiter keys on the peer address.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, true))
}

/// All routes with authentication and tracing.
///
/// With `rate_limited` set to `false` no peer address is needed, which is
/// how the integration tests drive it.
pub fn router(state: AppState, rate_limited: bool) -> Router {
    let auth_router = api::routes::auth_routes();
    let auth_router = if rate_limited {
        auth_router.layer(rate_limit::auth_layer())
    } else {
        auth_router
    };

    let links_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let public_router = Router::new()
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler));

    let general = Router::new().merge(links_router).merge(public_router);
    let general = if rate_limited {
        general.layer(rate_limit::layer())
    } else {
        general
    };

    Router::new()
        .nest("/auth", auth_router)
        .merge(general)
        .with_state(state)
        .layer(tracing::layer())
}
