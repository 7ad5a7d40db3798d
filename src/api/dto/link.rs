//! DTOs for link endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Link;

/// Request body for `POST /links`.
///
/// `code` is optional; a missing or blank code gets a generated one.
#[derive(Debug, Deserialize)]
pub struct LinkCreateRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// JSON representation of a link.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkResponse {
    pub id: i64,
    pub original_url: String,
    pub code: String,
    pub short_url: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub username: String,
}

impl LinkResponse {
    /// Builds the response; `short_url` comes from the service's base URL.
    pub fn from_link(link: Link, short_url: String) -> Self {
        Self {
            id: link.id,
            original_url: link.original_url,
            code: link.code,
            short_url,
            click_count: link.click_count,
            created_at: link.created_at,
            username: link.owner_username,
        }
    }
}
