//! Web API mailbox administration tests
//!
//! `/api/mailboxes/`, `/api/messages/`, `/api/mailboxes/create/` plus the
//! cross-cutting host, health and OpenAPI routes.

mod common;

use axum::http::{
    header::{AUTHORIZATION, HOST},
    StatusCode,
};
use serde_json::{json, Value};

use common::{
    bearer, create_test_app, create_test_app_with, create_test_config, get_json, login_user,
    register_and_get_token,
};
use webmail::auth::verify_password;
use webmail::db::{MailboxStore, MessageStore, UserStore};
use webmail::mailbox::{NewMessage, FOLDER_SENT};

// ============================================================================
// Listings
// ============================================================================

#[tokio::test]
async fn test_list_mailboxes_shows_every_owner() {
    let app = create_test_app().await;
    let token = register_and_get_token(&app.server, "alice").await;
    register_and_get_token(&app.server, "bobby").await;

    let body = get_json(&app.server, "/api/mailboxes/", &token).await;
    let mailboxes = body["mailboxes"].as_array().unwrap();

    assert_eq!(mailboxes.len(), 2);
    let mut owners: Vec<(&str, &str)> = mailboxes
        .iter()
        .map(|m| {
            (
                m["username"].as_str().unwrap(),
                m["address"].as_str().unwrap(),
            )
        })
        .collect();
    owners.sort();
    assert_eq!(
        owners,
        vec![
            ("alice", "alice@webiime.ir"),
            ("bobby", "bobby@webiime.ir")
        ]
    );
    assert!(mailboxes[0]["id"].is_i64());
    assert!(mailboxes[0]["created_at"].is_string());
}

#[tokio::test]
async fn test_list_mailboxes_requires_auth() {
    let app = create_test_app().await;

    let response = app.server.get("/api/mailboxes/").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_messages_all_folders_of_caller() {
    let app = create_test_app().await;
    let token = register_and_get_token(&app.server, "alice").await;
    let other = register_and_get_token(&app.server, "bobby").await;

    let alice = app.db.get_user_by_username("alice").await.unwrap().unwrap();
    let mailbox = app
        .db
        .get_mailbox_for_user(alice.id)
        .await
        .unwrap()
        .unwrap();

    app.db
        .create_message(&NewMessage::new(
            mailbox.id,
            "x@example.com",
            &mailbox.address,
            "in",
            "body",
        ))
        .await
        .unwrap();
    app.db
        .create_message(
            &NewMessage::new(mailbox.id, &mailbox.address, "x@example.com", "out", "")
                .in_folder(FOLDER_SENT),
        )
        .await
        .unwrap();

    let body = get_json(&app.server, "/api/messages/", &token).await;
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    for key in [
        "id",
        "subject",
        "sender",
        "recipients",
        "folder",
        "created_at",
        "is_read",
    ] {
        assert!(messages[0].get(key).is_some(), "missing {key}");
    }

    let body = get_json(&app.server, "/api/messages/", &other).await;
    assert!(body["messages"].as_array().unwrap().is_empty());
}

// ============================================================================
// Provisioning
// ============================================================================

#[tokio::test]
async fn test_create_mailbox_json() {
    let app = create_test_app().await;
    let token = register_and_get_token(&app.server, "alice").await;

    let response = app
        .server
        .post("/api/mailboxes/create/")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({"username": "carol", "password": "carolpass1"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["address"], "carol@webiime.ir");
    assert!(body["id"].is_i64());

    // The provisioned user can log in with the given password
    let login = login_user(&app.server, "carol", "carolpass1").await;
    assert!(login["access_token"].is_string());

    let carol = app.db.get_user_by_username("carol").await.unwrap().unwrap();
    assert_eq!(carol.email.as_deref(), Some("carol@webiime.ir"));
}

#[tokio::test]
async fn test_create_mailbox_form_without_password() {
    let app = create_test_app().await;
    let token = register_and_get_token(&app.server, "alice").await;

    let response = app
        .server
        .post("/api/mailboxes/create/")
        .add_header(AUTHORIZATION, bearer(&token))
        .form(&[("username", "dave")])
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["address"], "dave@webiime.ir");

    let dave = app.db.get_user_by_username("dave").await.unwrap().unwrap();
    assert!(dave.password.starts_with("$argon2id$"));
    assert!(verify_password("", &dave.password).is_err());
}

#[tokio::test]
async fn test_create_mailbox_existing_address() {
    let app = create_test_app().await;
    let token = register_and_get_token(&app.server, "alice").await;

    let response = app
        .server
        .post("/api/mailboxes/create/")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({"username": "alice"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"detail": "Mailbox already exists"}));

    let body = get_json(&app.server, "/api/mailboxes/", &token).await;
    assert_eq!(body["mailboxes"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_mailbox_invalid_username() {
    let app = create_test_app().await;
    let token = register_and_get_token(&app.server, "alice").await;

    for payload in [
        json!({"username": "a b"}),
        json!({"username": ".alice."}),
        json!({"username": "a..b"}),
        json!({"username": ""}),
        json!({}),
    ] {
        let response = app
            .server
            .post("/api/mailboxes/create/")
            .add_header(AUTHORIZATION, bearer(&token))
            .json(&payload)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    let body = get_json(&app.server, "/api/mailboxes/", &token).await;
    assert_eq!(body["mailboxes"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_mailbox_get_is_405() {
    let app = create_test_app().await;
    let token = register_and_get_token(&app.server, "alice").await;

    let response = app
        .server
        .get("/api/mailboxes/create/")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    response.assert_json(&json!({"detail": "POST required"}));
}

#[tokio::test]
async fn test_create_mailbox_requires_auth() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/mailboxes/create/")
        .json(&json!({"username": "carol"}))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(app.db.get_user_by_username("carol").await.unwrap().is_none());
}

#[tokio::test]
async fn test_provisioned_user_can_send() {
    let app = create_test_app().await;
    let token = register_and_get_token(&app.server, "alice").await;

    app.server
        .post("/api/mailboxes/create/")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({"username": "carol", "password": "carolpass1"}))
        .await
        .assert_status_ok();

    let login = login_user(&app.server, "carol", "carolpass1").await;
    let carol_token = login["access_token"].as_str().unwrap();

    let response = app
        .server
        .post("/compose/")
        .add_header(AUTHORIZATION, bearer(carol_token))
        .multipart(
            axum_test::multipart::MultipartForm::new()
                .add_text("to", "bob@example.com")
                .add_text("subject", "Hi"),
        )
        .await;
    response.assert_status(StatusCode::CREATED);

    let carol = app.db.get_user_by_username("carol").await.unwrap().unwrap();
    let mailbox = app.db.get_mailbox_for_user(carol.id).await.unwrap().unwrap();
    assert_eq!(app.db.list_messages(mailbox.id).await.unwrap().len(), 1);
    assert_eq!(app.sender.sent()[0].from, "carol@webiime.ir");
}

// ============================================================================
// Hosts, health, OpenAPI, headers
// ============================================================================

#[tokio::test]
async fn test_invalid_host_rejected() {
    let mut config = create_test_config();
    config.server.allowed_hosts = vec!["mail.webiime.ir".to_string()];
    let app = create_test_app_with(config).await;

    let response = app
        .server
        .get("/health")
        .add_header(HOST, "evil.example")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"detail": "Invalid host header"}));

    let response = app
        .server
        .get("/health")
        .add_header(HOST, "mail.webiime.ir:8000")
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_debug_disables_host_check() {
    let mut config = create_test_config();
    config.server.allowed_hosts = vec!["mail.webiime.ir".to_string()];
    config.security.debug = true;
    let app = create_test_app_with(config).await;

    let response = app
        .server
        .get("/health")
        .add_header(HOST, "evil.example")
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_health_and_security_headers() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
    assert_eq!(response.header("x-frame-options"), "DENY");
    assert_eq!(response.header("x-content-type-options"), "nosniff");
}

#[tokio::test]
async fn test_openapi_document() {
    let app = create_test_app().await;

    let response = app.server.get("/api/openapi.json").await;

    response.assert_status_ok();
    let doc: Value = response.json();
    assert!(doc["openapi"].is_string());
    assert!(doc["paths"]["/compose/"]["post"].is_object());
    assert!(doc["paths"]["/api/mailboxes/create/"]["post"].is_object());
}
