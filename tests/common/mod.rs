//! Test helpers for the web API tests.
//!
//! Provides an in-memory application behind an axum-test `TestServer` and a
//! mail sender that records instead of talking SMTP.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum_test::TestServer;
use serde_json::{json, Value};

use webmail::config::Config;
use webmail::mail::{DeliveryError, DeliveryReceipt, MailSender, OutgoingMail};
use webmail::web::handlers::AppState;
use webmail::web::middleware::{AllowedHosts, JwtState};
use webmail::web::router::create_router;
use webmail::Database;

pub const TEST_PASSWORD: &str = "password123";

/// Sender that keeps every message and can be switched to fail.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: AtomicBool,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MailSender for RecordingSender {
    async fn send(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt, DeliveryError> {
        self.sent.lock().unwrap().push(mail.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::Transport(
                "Connection refused (os error 111)".to_string(),
            ));
        }
        Ok(DeliveryReceipt {
            message_id: Some("<1@webiime.ir>".to_string()),
            recipients: mail.to.clone(),
            response: "2.0.0 Ok: queued as 4F2A1".to_string(),
        })
    }
}

/// A running test application.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub sender: Arc<RecordingSender>,
}

/// Create a test configuration.
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.security.secret_key = "test-secret-key-for-testing-only".to_string();
    config.server.allowed_hosts = vec!["*".to_string()];
    config.mail.max_attachment_size_mb = 1;
    config
}

/// Create a test application with the default test configuration.
pub async fn create_test_app() -> TestApp {
    create_test_app_with(create_test_config()).await
}

/// Create a test application with an in-memory database.
pub async fn create_test_app_with(config: Config) -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let sender = Arc::new(RecordingSender::default());

    let app_state = Arc::new(AppState::new(db.clone(), sender.clone(), &config));
    let jwt_state = Arc::new(JwtState::new(&config.security.secret_key));
    let allowed_hosts = Arc::new(AllowedHosts::new(
        &config.server.allowed_hosts,
        config.security.debug,
    ));

    let router = create_router(
        app_state,
        jwt_state,
        allowed_hosts,
        &config.server.cors_origins,
    );
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp { server, db, sender }
}

/// `Authorization` header value for a token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Register a user and return the response body.
pub async fn register_user(server: &TestServer, username: &str) -> Value {
    let response = server
        .post("/accounts/register/")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": TEST_PASSWORD,
            "password_confirm": TEST_PASSWORD
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

/// Register a user and return its access token.
pub async fn register_and_get_token(server: &TestServer, username: &str) -> String {
    let body = register_user(server, username).await;
    body["access_token"]
        .as_str()
        .expect("access_token missing")
        .to_string()
}

/// Log in and return the response body.
pub async fn login_user(server: &TestServer, username: &str, password: &str) -> Value {
    server
        .post("/accounts/login/")
        .json(&json!({
            "username": username,
            "password": password
        }))
        .await
        .json::<Value>()
}

/// GET with a bearer token.
pub async fn get_json(server: &TestServer, path: &str, token: &str) -> Value {
    let response = server
        .get(path)
        .add_header(AUTHORIZATION, bearer(token))
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}
