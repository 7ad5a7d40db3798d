#![allow(dead_code)]

use axum_test::TestServer;
use link_shortener::config::{Config, StorageBackend};
use link_shortener::domain::repositories::{LinkRepository, UserRepository};
use link_shortener::infrastructure::memory::MemoryStore;
use link_shortener::routes::router;
use link_shortener::state::AppState;
use link_shortener::utils::clock::Clock;
use serde_json::{Value, json};
use std::sync::Arc;

pub const TEST_SECRET: &str = "integration-test-secret-of-sufficient-length";
pub const BASE_URL: &str = "http://sho.rt";

pub fn test_config() -> Config {
    Config {
        storage_backend: StorageBackend::Memory,
        database_url: None,
        listen_addr: "127.0.0.1:0".to_string(),
        base_url: BASE_URL.to_string(),
        log_level: "debug".to_string(),
        log_format: "text".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        jwt_secret_is_default: false,
        jwt_expiration_hours: 1,
        short_code_length: 8,
        short_code_alphabet: link_shortener::utils::code_generator::DEFAULT_ALPHABET.to_string(),
        db_max_connections: 1,
        db_connect_timeout: 1,
        db_idle_timeout: 1,
        db_max_lifetime: 1,
    }
}

pub fn create_test_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let users: Arc<dyn UserRepository> = store.clone();
    let links: Arc<dyn LinkRepository> = store.clone();
    let state = AppState::new(users, links, &test_config()).unwrap();
    (state, store)
}

pub fn create_test_state_with_clock(clock: Arc<dyn Clock>) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let users: Arc<dyn UserRepository> = store.clone();
    let links: Arc<dyn LinkRepository> = store.clone();
    let state = AppState::with_clock(users, links, &test_config(), clock).unwrap();
    (state, store)
}

pub fn make_server(state: AppState) -> TestServer {
    TestServer::new(router(state, false)).unwrap()
}

pub fn test_server() -> (TestServer, Arc<MemoryStore>) {
    let (state, store) = create_test_state();
    (make_server(state), store)
}

/// Registers `username` with a valid password and returns the issued token.
pub async fn register(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/auth/register")
        .json(&json!({ "username": username, "password": "secret1" }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["token"]
        .as_str()
        .unwrap()
        .to_string()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Creates a link as the token's owner and returns the response body.
pub async fn create_link(server: &TestServer, token: &str, url: &str, code: Option<&str>) -> Value {
    let response = server
        .post("/links")
        .add_header("Authorization", bearer(token))
        .json(&json!({ "url": url, "code": code }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}
