//! Link entity representing a shortened URL owned by a user.

use chrono::{DateTime, Utc};

/// A shortened URL with its click counter and owner.
///
/// `owner_username` is joined from the users table and is what ownership
/// checks compare against.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: i64,
    pub original_url: String,
    pub code: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub owner_id: i64,
    pub owner_username: String,
}

impl Link {
    /// Returns true if `username` owns this link.
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.owner_username == username
    }

    /// Returns a copy with the click counter advanced by one.
    pub fn with_click(&self) -> Self {
        Self {
            click_count: self.click_count + 1,
            ..self.clone()
        }
    }
}

/// Input data for creating a new link.
///
/// The click counter always starts at zero, so it is not part of the input.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub original_url: String,
    pub code: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}
