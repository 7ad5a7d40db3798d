//! In-process storage backend.
//!
//! Users and links live in one `RwLock`-guarded state so that uniqueness
//! checks, inserts and cascading deletes are atomic with respect to each
//! other. Nothing survives a restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::entities::{Link, NewLink, NewUser, User};
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::error::AppError;
use crate::utils::db_error::unique_violation_message;

#[derive(Debug, Clone)]
struct StoredLink {
    id: i64,
    original_url: String,
    code: String,
    click_count: i64,
    created_at: chrono::DateTime<chrono::Utc>,
    owner_id: i64,
}

#[derive(Default)]
struct State {
    users: BTreeMap<i64, User>,
    links: BTreeMap<i64, StoredLink>,
    next_user_id: i64,
    next_link_id: i64,
}

impl State {
    fn materialize(&self, link: &StoredLink) -> Option<Link> {
        let owner = self.users.get(&link.owner_id)?;
        Some(Link {
            id: link.id,
            original_url: link.original_url.clone(),
            code: link.code.clone(),
            click_count: link.click_count,
            created_at: link.created_at,
            owner_id: link.owner_id,
            owner_username: owner.username.clone(),
        })
    }
}

/// Memory-backed implementation of both repository traits.
///
/// Ids start at 1 and are never reused. Uniqueness violations produce the
/// same [`AppError::Conflict`] messages as the PostgreSQL constraints.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn conflict(constraint: &str, field: &str, value: &str) -> AppError {
    AppError::conflict(
        unique_violation_message(Some(constraint)),
        json!({ field: value }),
    )
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.username == new_user.username) {
            return Err(conflict("users_username_key", "username", &new_user.username));
        }

        if let Some(email) = &new_user.email
            && state.users.values().any(|u| u.email.as_ref() == Some(email))
        {
            return Err(conflict("users_email_key", "email", email));
        }

        state.next_user_id += 1;
        let user = User {
            id: state.next_user_id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: new_user.created_at,
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut state = self.state.write().await;

        if state.users.remove(&id).is_none() {
            return Ok(false);
        }

        state.links.retain(|_, link| link.owner_id != id);
        Ok(true)
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut state = self.state.write().await;

        if state.links.values().any(|l| l.code == new_link.code) {
            tracing::warn!(code = %new_link.code, "Short code collision on insert");
            return Err(conflict("links_code_key", "code", &new_link.code));
        }

        if !state.users.contains_key(&new_link.owner_id) {
            return Err(AppError::not_found(
                "User not found",
                json!({ "id": new_link.owner_id }),
            ));
        }

        state.next_link_id += 1;
        let stored = StoredLink {
            id: state.next_link_id,
            original_url: new_link.original_url,
            code: new_link.code,
            click_count: 0,
            created_at: new_link.created_at,
            owner_id: new_link.owner_id,
        };

        let link = state
            .materialize(&stored)
            .ok_or_else(|| AppError::internal("Link owner vanished", json!({})))?;
        state.links.insert(stored.id, stored);

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .links
            .values()
            .find(|l| l.code == code)
            .and_then(|l| state.materialize(l)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let state = self.state.read().await;
        Ok(state.links.get(&id).and_then(|l| state.materialize(l)))
    }

    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Link>, AppError> {
        let state = self.state.read().await;

        let mut links: Vec<Link> = state
            .links
            .values()
            .filter(|l| l.owner_id == owner_id)
            .filter_map(|l| state.materialize(l))
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(links)
    }

    async fn update(&self, link: &Link) -> Result<Link, AppError> {
        let mut state = self.state.write().await;

        let stored = state
            .links
            .get_mut(&link.id)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": link.id })))?;
        stored.click_count = stored.click_count.max(link.click_count);
        let stored = stored.clone();

        state
            .materialize(&stored)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": link.id })))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.state.write().await.links.remove(&id).is_some())
    }
}
