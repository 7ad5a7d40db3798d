//! PostgreSQL repository tests.
//!
//! Need a database: `DATABASE_URL=... cargo test -- --ignored`.

use chrono::Utc;
use link_shortener::domain::entities::{Link, NewLink, NewUser};
use link_shortener::domain::repositories::{LinkRepository, UserRepository};
use link_shortener::error::AppError;
use link_shortener::infrastructure::persistence::{PgLinkRepository, PgUserRepository};
use sqlx::PgPool;
use std::sync::Arc;

fn repos(pool: PgPool) -> (PgUserRepository, PgLinkRepository) {
    let pool = Arc::new(pool);
    (
        PgUserRepository::new(pool.clone()),
        PgLinkRepository::new(pool),
    )
}

fn new_user(username: &str, email: Option<&str>) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.map(str::to_string),
        password_hash: "$argon2id$stub".to_string(),
        created_at: Utc::now(),
    }
}

fn new_link(code: &str, owner_id: i64) -> NewLink {
    NewLink {
        original_url: "http://example.com".to_string(),
        code: code.to_string(),
        owner_id,
        created_at: Utc::now(),
    }
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_create_and_find_user(pool: PgPool) {
    let (users, _) = repos(pool);

    let created = users.create(new_user("alice", Some("a@example.com"))).await.unwrap();
    let found = users.find_by_username("alice").await.unwrap().unwrap();

    assert_eq!(found.id, created.id);
    assert_eq!(found.email.as_deref(), Some("a@example.com"));
    assert!(users.find_by_username("Alice").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_duplicate_username_is_conflict(pool: PgPool) {
    let (users, _) = repos(pool);
    users.create(new_user("alice", None)).await.unwrap();

    let err = users.create(new_user("alice", None)).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict { .. }));
    assert_eq!(err.to_string(), "Username is already taken");
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_duplicate_code_is_conflict(pool: PgPool) {
    let (users, links) = repos(pool);
    let alice = users.create(new_user("alice", None)).await.unwrap();
    links.create(new_link("abc", alice.id)).await.unwrap();

    let err = links.create(new_link("abc", alice.id)).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict { .. }));
    assert_eq!(err.to_string(), "Short code is already in use");
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_link_joins_owner(pool: PgPool) {
    let (users, links) = repos(pool);
    let alice = users.create(new_user("alice", None)).await.unwrap();

    let created = links.create(new_link("abc", alice.id)).await.unwrap();
    let found = links.find_by_code("abc").await.unwrap().unwrap();

    assert_eq!(created.owner_username, "alice");
    assert_eq!(found.id, created.id);
    assert_eq!(found.click_count, 0);
    assert_eq!(links.find_by_id(created.id).await.unwrap().unwrap().code, "abc");
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_update_keeps_greatest_counter(pool: PgPool) {
    let (users, links) = repos(pool);
    let alice = users.create(new_user("alice", None)).await.unwrap();
    let link = links.create(new_link("abc", alice.id)).await.unwrap();

    let bumped = links.update(&Link { click_count: 4, ..link.clone() }).await.unwrap();
    let stale = links.update(&Link { click_count: 1, ..link.clone() }).await.unwrap();

    assert_eq!(bumped.click_count, 4);
    assert_eq!(stale.click_count, 4);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_find_by_owner_newest_first(pool: PgPool) {
    let (users, links) = repos(pool);
    let alice = users.create(new_user("alice", None)).await.unwrap();
    let bob = users.create(new_user("bob", None)).await.unwrap();

    let mut older = new_link("old", alice.id);
    older.created_at = Utc::now() - chrono::Duration::minutes(5);
    links.create(older).await.unwrap();
    links.create(new_link("new", alice.id)).await.unwrap();
    links.create(new_link("other", bob.id)).await.unwrap();

    let codes: Vec<String> = links
        .find_by_owner(alice.id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.code)
        .collect();

    assert_eq!(codes, vec!["new", "old"]);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_delete_user_cascades(pool: PgPool) {
    let (users, links) = repos(pool);
    let alice = users.create(new_user("alice", None)).await.unwrap();
    let link = links.create(new_link("abc", alice.id)).await.unwrap();

    assert!(users.delete(alice.id).await.unwrap());
    assert!(links.find_by_id(link.id).await.unwrap().is_none());
    assert!(!users.delete(alice.id).await.unwrap());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_delete_link(pool: PgPool) {
    let (users, links) = repos(pool);
    let alice = users.create(new_user("alice", None)).await.unwrap();
    let link = links.create(new_link("abc", alice.id)).await.unwrap();

    assert!(links.delete(link.id).await.unwrap());
    assert!(!links.delete(link.id).await.unwrap());
}
