//! Handlers for link management endpoints (create, list, delete).

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::dto::link::{LinkCreateRequest, LinkResponse};
use crate::api::middleware::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for the authenticated user.
///
/// # Endpoint
///
/// `POST /links`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/page", "code": "my-page" }
/// ```
///
/// `code` is optional; without it an 8-character code is generated.
///
/// # Response Codes
///
/// - **201 Created**: Link created
/// - **400 Bad Request**: URL is not http(s) or code has invalid characters
/// - **401 Unauthorized**: Missing or invalid token
/// - **404 Not Found**: Token subject no longer exists
/// - **409 Conflict**: Code already in use
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(AuthUser(username)): Extension<AuthUser>,
    Json(payload): Json<LinkCreateRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let link = state
        .link_service
        .create_link(&username, payload.url, payload.code)
        .await?;

    let short_url = state.link_service.get_short_url(&link.code);

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, short_url)),
    ))
}

/// Lists the authenticated user's links, newest first.
///
/// `GET /my-links`
pub async fn my_links_handler(
    State(state): State<AppState>,
    Extension(AuthUser(username)): Extension<AuthUser>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let links = state.link_service.list_links(&username).await?;

    let items = links
        .into_iter()
        .map(|link| {
            let short_url = state.link_service.get_short_url(&link.code);
            LinkResponse::from_link(link, short_url)
        })
        .collect();

    Ok(Json(items))
}

/// Deletes one of the authenticated user's links.
///
/// # Endpoint
///
/// `DELETE /links/{id}`
///
/// # Response Codes
///
/// - **204 No Content**: Deleted
/// - **403 Forbidden**: Link belongs to another user
/// - **404 Not Found**: No link with this id
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(AuthUser(username)): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(id, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}
