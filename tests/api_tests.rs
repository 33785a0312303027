mod common;

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use chrono::{Duration, Utc};
use common::{create_test_server, login, tokens};
use rstest::rstest;
use serde_json::json;

// ============= Public Route Tests =============

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_hello() {
    let server = create_test_server().await;

    let response = server.get("/api/v1/hello").await;
    response.assert_status_ok();
    response.assert_text("Hello World!");
}

#[tokio::test]
async fn test_openapi_document() {
    let server = create_test_server().await;

    let response = server.get("/api/openapi.json").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["paths"]["/api/v1/users/me"].is_object());
}

// ============= Login Tests =============

#[tokio::test]
async fn test_login_success() {
    let server = create_test_server().await;

    let response = server
        .post("/api/v1/users/login")
        .json(&json!({"identifier": "user", "secret": "correctpassword"}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], 200);
    assert_eq!(body["message"], "Success");
    let token = body["data"]["accessToken"].as_str().expect("token");
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_login_accepts_username_password_aliases() {
    let server = create_test_server().await;

    let response = server
        .post("/api/v1/users/login")
        .json(&json!({"username": "user", "password": "correctpassword"}))
        .await;

    response.assert_status_ok();
}

#[rstest]
#[case::wrong_secret("user", "wrongpassword")]
#[case::unknown_identifier("nobody", "correctpassword")]
#[case::identifier_case_differs("User", "correctpassword")]
#[case::inactive_account("inactive", "inactivepassword")]
#[tokio::test]
async fn test_login_failures_are_uniform(#[case] identifier: &str, #[case] secret: &str) {
    let server = create_test_server().await;

    let response = server
        .post("/api/v1/users/login")
        .json(&json!({"identifier": identifier, "secret": secret}))
        .await;

    response.assert_status_unauthorized();
    response.assert_json(&json!({
        "status": 401,
        "message": "Authentication failed",
        "data": null
    }));
}

#[tokio::test]
async fn test_login_missing_fields() {
    let server = create_test_server().await;

    let response = server
        .post("/api/v1/users/login")
        .json(&json!({"identifier": "user"}))
        .await;

    response.assert_status_bad_request();
    response.assert_json(&json!({
        "status": 400,
        "message": "Bad Request",
        "data": {"secret": "required"}
    }));
}

#[tokio::test]
async fn test_login_undecodable_body() {
    let server = create_test_server().await;

    let response = server.post("/api/v1/users/login").text("{not json").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], 500);
    assert!(!body["message"].as_str().expect("message").is_empty());
    assert_ne!(body["message"], "Bad Request");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_login_identifier_given_twice_is_undecodable() {
    let server = create_test_server().await;

    let response = server
        .post("/api/v1/users/login")
        .json(&json!({"identifier": "user", "username": "user", "secret": "correctpassword"}))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains("duplicate field"));
}

// ============= Token Verifier Tests =============

#[tokio::test]
async fn test_me_without_token() {
    let server = create_test_server().await;

    let response = server.get("/api/v1/users/me").await;

    response.assert_status_unauthorized();
    response.assert_json(&json!({"status": 401, "message": "Unauthorized", "data": null}));
}

#[tokio::test]
async fn test_me_with_token() {
    let server = create_test_server().await;
    let token = login(&server, "user", "correctpassword").await;

    let response = server
        .get("/api/v1/users/me")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Success");
    assert_eq!(body["data"]["username"], "user");
    assert_eq!(body["data"]["email"], "user@example.com");
    assert_eq!(body["data"]["isActive"], true);
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_rejected_tokens_are_indistinguishable() {
    let server = create_test_server().await;
    let foreign = gatekeeper::auth::TokenService::new(
        &gatekeeper::auth::SigningKey::new("another-secret").expect("key"),
        Duration::hours(72),
    )
    .issue("user")
    .expect("issue");
    let expired = tokens()
        .issue_at("user", Utc::now() - Duration::hours(100))
        .expect("issue");
    let unknown = tokens().issue("ghost").expect("issue");

    for header in [
        "Bearer".to_string(),
        "Token abc".to_string(),
        "Bearer not.a.token".to_string(),
        format!("Bearer {}", foreign),
        format!("Bearer {}", expired),
        format!("Bearer {}", unknown),
    ] {
        let response = server
            .get("/api/v1/users/me")
            .add_header(
                AUTHORIZATION,
                HeaderValue::from_str(&header).expect("valid header"),
            )
            .await;

        response.assert_status_unauthorized();
        response.assert_json(&json!({"status": 401, "message": "Unauthorized", "data": null}));
    }
}

// ============= Account Management Tests =============

#[tokio::test]
async fn test_create_user_collects_all_violations() {
    let server = create_test_server().await;
    let token = login(&server, "user", "correctpassword").await;

    let response = server
        .post("/api/v1/users")
        .authorization_bearer(&token)
        .json(&json!({
            "username": "abc",
            "password": "abc",
            "repeatPassword": "abd",
            "email": "not-an-email"
        }))
        .await;

    response.assert_status_bad_request();
    response.assert_json(&json!({
        "status": 400,
        "message": "Bad Request",
        "data": {
            "username": "min",
            "password": "min",
            "repeatpassword": "eqfield",
            "email": "email"
        }
    }));
}

#[tokio::test]
async fn test_validation_runs_before_token_verification() {
    let server = create_test_server().await;

    let response = server.post("/api/v1/users").json(&json!({})).await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["username"], "required");
}

#[tokio::test]
async fn test_create_user_requires_token() {
    let server = create_test_server().await;

    let response = server
        .post("/api/v1/users")
        .json(&json!({
            "username": "newuser",
            "password": "newpassword",
            "repeatPassword": "newpassword",
            "email": "newuser@example.com"
        }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_create_user_then_login() {
    let server = create_test_server().await;
    let token = login(&server, "user", "correctpassword").await;

    let response = server
        .post("/api/v1/users")
        .authorization_bearer(&token)
        .json(&json!({
            "username": "newuser",
            "password": "newpassword",
            "repeatPassword": "newpassword",
            "email": "newuser@example.com"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["username"], "newuser");
    assert_eq!(body["data"]["roles"], json!([]));

    let new_token = login(&server, "newuser", "newpassword").await;
    assert!(!new_token.is_empty());
}

#[rstest]
#[case::duplicate_username("admin", "other@example.com", "Username already exists")]
#[case::duplicate_email("another", "user@example.com", "Email already exists")]
#[tokio::test]
async fn test_create_user_conflicts(
    #[case] username: &str,
    #[case] email: &str,
    #[case] message: &str,
) {
    let server = create_test_server().await;
    let token = login(&server, "user", "correctpassword").await;

    let response = server
        .post("/api/v1/users")
        .authorization_bearer(&token)
        .json(&json!({
            "username": username,
            "password": "password",
            "repeatPassword": "password",
            "email": email
        }))
        .await;

    response.assert_status_bad_request();
    response.assert_json(&json!({"status": 400, "message": message, "data": null}));
}

#[tokio::test]
async fn test_find_users_by_fragment() {
    let server = create_test_server().await;
    let token = login(&server, "user", "correctpassword").await;

    let response = server
        .get("/api/v1/users")
        .add_query_param("username", "adm")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let users = body["data"].as_array().expect("list");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "admin");
}

// ============= Authorization Gate Tests =============

#[tokio::test]
async fn test_update_requires_admin_role() {
    let server = create_test_server().await;
    let token = login(&server, "user", "correctpassword").await;

    let response = server
        .patch("/api/v1/users/1")
        .authorization_bearer(&token)
        .json(&json!({"isActive": false}))
        .await;

    response.assert_status_unauthorized();
    response.assert_json(&json!({"status": 401, "message": "Unauthorized", "data": null}));
}

#[tokio::test]
async fn test_admin_deactivates_account() {
    let server = create_test_server().await;
    let admin = login(&server, "admin", "adminpassword").await;
    let user = login(&server, "user", "correctpassword").await;

    let me: serde_json::Value = server
        .get("/api/v1/users/me")
        .authorization_bearer(&user)
        .await
        .json();
    let id = me["data"]["id"].as_i64().expect("id");

    let response = server
        .patch(&format!("/api/v1/users/{}", id))
        .authorization_bearer(&admin)
        .json(&json!({"isActive": false}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["isActive"], false);

    let response = server
        .post("/api/v1/users/login")
        .json(&json!({"identifier": "user", "secret": "correctpassword"}))
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_reactivated_account_reaches_protected_route() {
    let server = create_test_server().await;
    let admin = login(&server, "admin", "adminpassword").await;

    for active in [false, true] {
        server
            .patch("/api/v1/users/1")
            .authorization_bearer(&admin)
            .json(&json!({"isActive": active}))
            .await
            .assert_status_ok();
    }

    let token = login(&server, "user", "correctpassword").await;
    let response = server
        .get("/api/v1/users/me")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["username"], "user");
    assert_eq!(body["data"]["email"], "user@example.com");
    assert_eq!(body["data"]["isActive"], true);
}

#[tokio::test]
async fn test_update_with_empty_strings_keeps_credentials() {
    let server = create_test_server().await;
    let admin = login(&server, "admin", "adminpassword").await;

    let response = server
        .patch("/api/v1/users/1")
        .authorization_bearer(&admin)
        .json(&json!({"password": "", "repeatPassword": "", "email": ""}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["email"], "user@example.com");

    let token = login(&server, "user", "correctpassword").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_admin_changes_password() {
    let server = create_test_server().await;
    let admin = login(&server, "admin", "adminpassword").await;

    let response = server
        .patch("/api/v1/users/1")
        .authorization_bearer(&admin)
        .json(&json!({"password": "freshpassword", "repeatPassword": "freshpassword"}))
        .await;
    response.assert_status_ok();

    let token = login(&server, "user", "freshpassword").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_update_password_needs_repeat() {
    let server = create_test_server().await;
    let admin = login(&server, "admin", "adminpassword").await;

    let response = server
        .patch("/api/v1/users/1")
        .authorization_bearer(&admin)
        .json(&json!({"password": "freshpassword"}))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"], json!({"repeatpassword": "required_with"}));
}

#[rstest]
#[case::unknown_id("/api/v1/users/999", 404, "User not found")]
#[case::malformed_id("/api/v1/users/abc", 400, "Invalid user id")]
#[tokio::test]
async fn test_update_bad_target(#[case] path: &str, #[case] status: u16, #[case] message: &str) {
    let server = create_test_server().await;
    let admin = login(&server, "admin", "adminpassword").await;

    let response = server
        .patch(path)
        .authorization_bearer(&admin)
        .json(&json!({"isActive": true}))
        .await;

    assert_eq!(response.status_code().as_u16(), status);
    response.assert_json(&json!({"status": status, "message": message, "data": null}));
}
