//! Shared setup for the integration tests.

#![allow(dead_code)]

use axum_test::TestServer;
use gatekeeper::{
    auth::{SigningKey, TokenService},
    db::{seed_identities, MemoryIdentityStore, SeedIdentity},
    utils::config::AuthConfig,
    AppState, GatekeeperConfig,
};
use serde_json::json;
use std::sync::Arc;

pub const SECRET: &str = "integration-test-secret";

pub fn signing_key() -> SigningKey {
    SigningKey::new(SECRET).expect("non-empty key")
}

/// Token service sharing the test server's key.
pub fn tokens() -> TokenService {
    TokenService::new(&signing_key(), chrono::Duration::hours(72))
}

fn seed(username: &str, password: &str, roles: &[&str], is_active: bool) -> SeedIdentity {
    SeedIdentity {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: password.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        is_active,
    }
}

/// App state with a cheap hash cost and three seeded accounts:
/// `user`, `admin` (role `admin`) and the deactivated `inactive`.
pub async fn create_test_state() -> AppState {
    let config = GatekeeperConfig {
        auth: AuthConfig {
            hash_cost: 1,
            ..AuthConfig::default()
        },
        ..GatekeeperConfig::default()
    };

    let store = Arc::new(MemoryIdentityStore::new());
    let state = AppState::build(config, &signing_key(), store.clone()).expect("state");

    seed_identities(
        store.as_ref(),
        &state.hasher,
        &[
            seed("user", "correctpassword", &[], true),
            seed("admin", "adminpassword", &["admin"], true),
            seed("inactive", "inactivepassword", &[], false),
        ],
    )
    .await
    .expect("seed");

    state
}

pub async fn create_test_server() -> TestServer {
    let state = create_test_state().await;
    TestServer::new(gatekeeper::app(state)).expect("Failed to create test server")
}

/// Logs in and returns the access token.
pub async fn login(server: &TestServer, identifier: &str, secret: &str) -> String {
    let response = server
        .post("/api/v1/users/login")
        .json(&json!({ "identifier": identifier, "secret": secret }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["data"]["accessToken"]
        .as_str()
        .expect("access token")
        .to_string()
}
