//! Link creation, redirect resolution, listing and deletion.

use std::sync::Arc;

use serde_json::json;

use crate::application::validation::{is_blank, validate_link_request};
use crate::domain::entities::{Link, NewLink, User};
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::error::AppError;
use crate::utils::clock::Clock;
use crate::utils::code_generator::CodeGenerator;

/// Service for the lifecycle of a user's short links.
///
/// Every operation that acts on behalf of a user takes an already
/// authenticated username.
pub struct LinkService<L: LinkRepository + ?Sized, U: UserRepository + ?Sized> {
    link_repository: Arc<L>,
    user_repository: Arc<U>,
    generator: Arc<CodeGenerator>,
    clock: Arc<dyn Clock>,
    base_url: String,
}

impl<L: LinkRepository + ?Sized, U: UserRepository + ?Sized> LinkService<L, U> {
    /// Creates a new link service.
    ///
    /// `base_url` is the public prefix of short URLs; a trailing slash is
    /// ignored.
    pub fn new(
        link_repository: Arc<L>,
        user_repository: Arc<U>,
        generator: Arc<CodeGenerator>,
        clock: Arc<dyn Clock>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            link_repository,
            user_repository,
            generator,
            clock,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a short link owned by `username`.
    ///
    /// # Code Allocation
    ///
    /// - A non-blank `custom_code` is format-checked, then checked for
    ///   uniqueness, then used.
    /// - Otherwise a random code is generated and used as-is. A collision with
    ///   an existing code is rejected by the store at insert time and
    ///   surfaces as [`AppError::Conflict`]; there is no retry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user no longer exists,
    /// [`AppError::Validation`] for a bad URL or code,
    /// [`AppError::Conflict`] if the code is taken.
    pub async fn create_link(
        &self,
        username: &str,
        original_url: String,
        custom_code: Option<String>,
    ) -> Result<Link, AppError> {
        let owner = self.find_owner(username).await?;

        validate_link_request(&original_url, custom_code.as_deref())?;

        let code = match custom_code.filter(|c| !is_blank(c)) {
            Some(custom) => {
                self.ensure_unique(&custom).await?;
                custom
            }
            None => self.generator.generate(),
        };

        let new_link = NewLink {
            original_url,
            code,
            owner_id: owner.id,
            created_at: self.clock.now(),
        };

        let link = self.link_repository.create(new_link).await?;

        tracing::info!(
            code = %link.code,
            owner = %link.owner_username,
            link_id = link.id,
            "Short link created"
        );

        Ok(link)
    }

    /// Fails with [`AppError::Conflict`] if a link already uses `code`.
    pub async fn ensure_unique(&self, code: &str) -> Result<(), AppError> {
        if self.link_repository.find_by_code(code).await?.is_some() {
            return Err(AppError::conflict(
                "Short code is already in use",
                json!({ "code": code }),
            ));
        }

        Ok(())
    }

    /// Resolves a short code, counting the visit.
    ///
    /// The counter update is a read-modify-write; concurrent redirects of the
    /// same code may lose increments but never decrease the count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    pub async fn resolve_redirect(&self, code: &str) -> Result<String, AppError> {
        let link = self
            .link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        let updated = self.link_repository.update(&link.with_click()).await?;

        tracing::debug!(code, clicks = updated.click_count, "Redirect resolved");

        Ok(updated.original_url)
    }

    /// Lists the links owned by `username`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user no longer exists.
    pub async fn list_links(&self, username: &str) -> Result<Vec<Link>, AppError> {
        let owner = self.find_owner(username).await?;
        self.link_repository.find_by_owner(owner.id).await
    }

    /// Deletes a link owned by `username`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist,
    /// [`AppError::Forbidden`] if it belongs to someone else.
    pub async fn delete_link(&self, id: i64, username: &str) -> Result<(), AppError> {
        let link = self
            .link_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))?;

        if !link.is_owned_by(username) {
            tracing::warn!(link_id = id, username, "Refused to delete another user's link");
            return Err(AppError::forbidden(
                "Not allowed to delete this link",
                json!({ "id": id }),
            ));
        }

        if !self.link_repository.delete(id).await? {
            return Err(AppError::not_found("Link not found", json!({ "id": id })));
        }

        tracing::info!(link_id = id, code = %link.code, username, "Short link deleted");

        Ok(())
    }

    /// Full public URL for a short code.
    pub fn get_short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }

    async fn find_owner(&self, username: &str) -> Result<User, AppError> {
        self.user_repository
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "username": username })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockLinkRepository, MockUserRepository};
    use crate::utils::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn user(id: i64, username: &str) -> User {
        User {
            id,
            username: username.to_string(),
            email: None,
            password_hash: "$argon2id$stub".to_string(),
            created_at: Utc::now(),
        }
    }

    fn link(id: i64, code: &str, owner: &str) -> Link {
        Link {
            id,
            original_url: "http://example.com".to_string(),
            code: code.to_string(),
            click_count: 0,
            created_at: Utc::now(),
            owner_id: 1,
            owner_username: owner.to_string(),
        }
    }

    fn users_with_alice() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .withf(|name| name == "alice")
            .returning(|_| Ok(Some(user(1, "alice"))));
        users
    }

    fn service(
        links: MockLinkRepository,
        users: MockUserRepository,
    ) -> LinkService<MockLinkRepository, MockUserRepository> {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
        LinkService::new(
            Arc::new(links),
            Arc::new(users),
            Arc::new(CodeGenerator::with_defaults()),
            Arc::new(clock),
            "http://localhost:8080/",
        )
    }

    fn echo_create(new_link: NewLink) -> Result<Link, AppError> {
        Ok(Link {
            id: 10,
            original_url: new_link.original_url,
            code: new_link.code,
            click_count: 0,
            created_at: new_link.created_at,
            owner_id: new_link.owner_id,
            owner_username: "alice".to_string(),
        })
    }

    #[tokio::test]
    async fn test_create_link_generates_code() {
        let mut links = MockLinkRepository::new();
        // Generated codes are not pre-checked.
        links.expect_find_by_code().times(0);
        links
            .expect_create()
            .withf(|l| {
                l.code.len() == 8
                    && l.code.chars().all(|c| c.is_ascii_alphanumeric())
                    && l.owner_id == 1
                    && l.created_at == Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
            })
            .times(1)
            .returning(echo_create);

        let link = service(links, users_with_alice())
            .create_link("alice", "http://example.com".into(), None)
            .await
            .unwrap();

        assert_eq!(link.original_url, "http://example.com");
        assert_eq!(link.click_count, 0);
        assert_eq!(link.code.len(), 8);
    }

    #[tokio::test]
    async fn test_create_link_blank_custom_code_is_generated() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(0);
        links
            .expect_create()
            .withf(|l| l.code.len() == 8)
            .times(1)
            .returning(echo_create);

        let result = service(links, users_with_alice())
            .create_link("alice", "http://example.com".into(), Some("   ".into()))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_link_with_custom_code() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .withf(|code| code == "my-link")
            .times(1)
            .returning(|_| Ok(None));
        links
            .expect_create()
            .withf(|l| l.code == "my-link")
            .times(1)
            .returning(echo_create);

        let link = service(links, users_with_alice())
            .create_link("alice", "https://rust-lang.org".into(), Some("my-link".into()))
            .await
            .unwrap();

        assert_eq!(link.code, "my-link");
    }

    #[tokio::test]
    async fn test_create_link_custom_code_conflict() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .times(1)
            .returning(|code| Ok(Some(link(5, code, "bob"))));
        links.expect_create().times(0);

        let result = service(links, users_with_alice())
            .create_link("alice", "http://example.com".into(), Some("taken".into()))
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_create_link_custom_code_with_at_sign() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().times(0);
        links.expect_create().times(0);

        let result = service(links, users_with_alice())
            .create_link("alice", "http://example.com".into(), Some("bad@code".into()))
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_link_invalid_url() {
        let mut links = MockLinkRepository::new();
        links.expect_create().times(0);

        let result = service(links, users_with_alice())
            .create_link("alice", "example.com".into(), None)
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_link_unknown_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        let mut links = MockLinkRepository::new();
        links.expect_create().times(0);

        let result = service(links, users)
            .create_link("ghost", "http://example.com".into(), None)
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_link_store_collision_is_not_retried() {
        let mut links = MockLinkRepository::new();
        links.expect_create().times(1).returning(|_| {
            Err(AppError::conflict(
                "Short code is already in use",
                serde_json::json!({}),
            ))
        });

        let result = service(links, users_with_alice())
            .create_link("alice", "http://example.com".into(), None)
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_resolve_redirect_increments_counter() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .withf(|code| code == "abc12345")
            .times(1)
            .returning(|code| Ok(Some(link(1, code, "alice"))));
        links
            .expect_update()
            .withf(|l| l.click_count == 1 && l.id == 1)
            .times(1)
            .returning(|l| Ok(l.clone()));

        let url = service(links, MockUserRepository::new())
            .resolve_redirect("abc12345")
            .await
            .unwrap();

        assert_eq!(url, "http://example.com");
    }

    #[tokio::test]
    async fn test_resolve_redirect_unknown_code() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().returning(|_| Ok(None));
        links.expect_update().times(0);

        let result = service(links, MockUserRepository::new())
            .resolve_redirect("missing")
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_links_for_owner() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_owner()
            .withf(|owner_id| *owner_id == 1)
            .times(1)
            .returning(|_| Ok(vec![link(2, "b", "alice"), link(1, "a", "alice")]));

        let result = service(links, users_with_alice())
            .list_links("alice")
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_link_by_owner() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_id()
            .returning(|id| Ok(Some(link(id, "abc", "alice"))));
        links
            .expect_delete()
            .withf(|id| *id == 3)
            .times(1)
            .returning(|_| Ok(true));

        let result = service(links, MockUserRepository::new())
            .delete_link(3, "alice")
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_link_by_non_owner() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_id()
            .returning(|id| Ok(Some(link(id, "abc", "alice"))));
        links.expect_delete().times(0);

        let result = service(links, MockUserRepository::new())
            .delete_link(3, "bob")
            .await;

        assert!(matches!(result, Err(AppError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_delete_link_not_found() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_id().returning(|_| Ok(None));
        links.expect_delete().times(0);

        let result = service(links, MockUserRepository::new())
            .delete_link(99, "alice")
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[test]
    fn test_get_short_url_trims_trailing_slash() {
        let svc = service(MockLinkRepository::new(), MockUserRepository::new());
        assert_eq!(svc.get_short_url("abc"), "http://localhost:8080/abc");
    }
}
