//! Router configuration.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::Redirect,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    compose, compose_form, create_mailbox, inbox, list_mailboxes, list_messages, login, logout,
    post_required, refresh, register, AppState,
};
use super::middleware::{
    check_host, create_cors_layer, jwt_auth, security_headers, AllowedHosts, JwtState,
};
use super::openapi::openapi_json;

/// Room for the text fields and multipart framing on top of the attachments.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create the application router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    allowed_hosts: Arc<AllowedHosts>,
    cors_origins: &[String],
) -> Router {
    let account_routes = Router::new()
        .route("/login/", post(login))
        .route("/logout/", post(logout))
        .route("/register/", post(register))
        .route("/refresh/", post(refresh));

    let compose_limit = app_state.max_attachment_size + FORM_OVERHEAD_BYTES;

    let mailbox_routes = Router::new()
        .route("/inbox/", get(inbox))
        .route(
            "/compose/",
            get(compose_form)
                .post(compose)
                .layer(DefaultBodyLimit::max(compose_limit)),
        );

    let api_routes = Router::new()
        .route("/mailboxes/", get(list_mailboxes))
        .route("/messages/", get(list_messages))
        .route(
            "/mailboxes/create/",
            post(create_mailbox).fallback(post_required),
        )
        .route("/openapi.json", get(openapi_json));

    Router::new()
        .route("/", get(|| async { Redirect::to("/inbox/") }))
        .nest("/accounts", account_routes)
        .nest("/api", api_routes)
        .merge(mailbox_routes)
        .merge(create_health_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(move |req, next| {
                    let allowed = allowed_hosts.clone();
                    check_host(allowed, req, next)
                }))
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Liveness probe.
pub fn create_health_router<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}
