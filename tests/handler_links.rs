mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use link_shortener::utils::clock::FixedClock;
use serde_json::{Value, json};
use std::sync::Arc;

#[tokio::test]
async fn test_create_link_generated_code() {
    let (server, _) = common::test_server();
    let token = common::register(&server, "alice").await;

    let body = common::create_link(&server, &token, "http://example.com", None).await;

    let code = body["code"].as_str().unwrap();
    assert_eq!(code.len(), 8);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(body["original_url"], "http://example.com");
    assert_eq!(body["click_count"], 0);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["short_url"], format!("{}/{}", common::BASE_URL, code));
}

#[tokio::test]
async fn test_create_link_custom_code() {
    let (server, _) = common::test_server();
    let token = common::register(&server, "alice").await;

    let body = common::create_link(&server, &token, "https://rust-lang.org", Some("rust_1-x")).await;

    assert_eq!(body["code"], "rust_1-x");
}

#[tokio::test]
async fn test_create_link_blank_code_is_generated() {
    let (server, _) = common::test_server();
    let token = common::register(&server, "alice").await;

    let body = common::create_link(&server, &token, "http://example.com", Some("  ")).await;

    assert_eq!(body["code"].as_str().unwrap().len(), 8);
}

#[tokio::test]
async fn test_create_link_duplicate_custom_code() {
    let (server, _) = common::test_server();
    let alice = common::register(&server, "alice").await;
    let bob = common::register(&server, "bob").await;
    common::create_link(&server, &alice, "http://example.com", Some("taken")).await;

    let response = server
        .post("/links")
        .add_header("Authorization", common::bearer(&bob))
        .json(&json!({ "url": "http://example.org", "code": "taken" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_link_invalid_code_characters() {
    let (server, _) = common::test_server();
    let token = common::register(&server, "alice").await;

    let response = server
        .post("/links")
        .add_header("Authorization", common::bearer(&token))
        .json(&json!({ "url": "http://example.com", "code": "bad@code" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_link_invalid_url() {
    let (server, _) = common::test_server();
    let token = common::register(&server, "alice").await;

    for url in ["example.com", "ftp://example.com", ""] {
        let response = server
            .post("/links")
            .add_header("Authorization", common::bearer(&token))
            .json(&json!({ "url": url }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"]["message"],
            "Invalid original URL"
        );
    }
}

#[tokio::test]
async fn test_create_link_url_with_line_break() {
    let (server, _) = common::test_server();
    let token = common::register(&server, "alice").await;

    let response = server
        .post("/links")
        .add_header("Authorization", common::bearer(&token))
        .json(&json!({ "url": "http://example.com/\nx", "code": "nl" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Invalid original URL"
    );

    server.get("/nl").await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (server, _) = common::test_server();

    let no_header = server
        .post("/links")
        .json(&json!({ "url": "http://example.com" }))
        .await;
    no_header.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(no_header.header("www-authenticate"), "Bearer");

    server
        .get("/my-links")
        .add_header("Authorization", "Bearer forged.token.value")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .delete("/links/1")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let issued_at = Utc::now() - Duration::hours(2);
    let (past_state, _) = common::create_test_state_with_clock(Arc::new(FixedClock(issued_at)));
    let past_server = common::make_server(past_state);
    let stale_token = common::register(&past_server, "alice").await;

    let (server, _) = common::test_server();
    common::register(&server, "alice").await;

    server
        .get("/my-links")
        .add_header("Authorization", common::bearer(&stale_token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_of_deleted_user() {
    let (server, store) = common::test_server();
    let token = common::register(&server, "ghost").await;

    let user = link_shortener::domain::repositories::UserRepository::find_by_username(
        store.as_ref(),
        "ghost",
    )
    .await
    .unwrap()
    .unwrap();
    link_shortener::domain::repositories::UserRepository::delete(store.as_ref(), user.id)
        .await
        .unwrap();

    server
        .get("/my-links")
        .add_header("Authorization", common::bearer(&token))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_my_links_only_own_newest_first() {
    let (server, _) = common::test_server();
    let alice = common::register(&server, "alice").await;
    let bob = common::register(&server, "bob").await;

    common::create_link(&server, &alice, "http://one.example", Some("one")).await;
    common::create_link(&server, &bob, "http://bob.example", Some("bobs")).await;
    common::create_link(&server, &alice, "http://two.example", Some("two")).await;

    let response = server
        .get("/my-links")
        .add_header("Authorization", common::bearer(&alice))
        .await;

    response.assert_status_ok();
    let links: Vec<Value> = response.json();
    let codes: Vec<&str> = links.iter().map(|l| l["code"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["two", "one"]);
}

#[tokio::test]
async fn test_delete_link_by_owner() {
    let (server, _) = common::test_server();
    let token = common::register(&server, "alice").await;
    let link = common::create_link(&server, &token, "http://example.com", None).await;
    let id = link["id"].as_i64().unwrap();

    server
        .delete(&format!("/links/{id}"))
        .add_header("Authorization", common::bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .delete(&format!("/links/{id}"))
        .add_header("Authorization", common::bearer(&token))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_delete_link_of_another_user() {
    let (server, _) = common::test_server();
    let alice = common::register(&server, "alice").await;
    let bob = common::register(&server, "bob").await;
    let link = common::create_link(&server, &alice, "http://example.com", Some("mine")).await;
    let id = link["id"].as_i64().unwrap();

    server
        .delete(&format!("/links/{id}"))
        .add_header("Authorization", common::bearer(&bob))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    // Still redirects.
    server.get("/mine").await.assert_status(StatusCode::FOUND);
}

#[tokio::test]
async fn test_delete_unknown_link() {
    let (server, _) = common::test_server();
    let token = common::register(&server, "alice").await;

    server
        .delete("/links/999")
        .add_header("Authorization", common::bearer(&token))
        .await
        .assert_status_not_found();
}
