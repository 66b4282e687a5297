//! OpenAPI document.

use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::dto::{
    ComposeContextResponse, ComposeFields, ComposeForm, ComposeResponse, CreateMailboxRequest,
    DeliveryResponse, InboxResponse, LoginRequest, MailboxCreatedResponse, MailboxListResponse,
    MailboxResponse, MessageListResponse, MessageResponse, RefreshRequest, RegisterRequest,
    TokenResponse, UserInfo,
};
use super::error::ErrorBody;
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(title = "webmail", description = "Webmail accounts, mailboxes and SMTP sending"),
    paths(
        handlers::accounts::login,
        handlers::accounts::logout,
        handlers::accounts::register,
        handlers::accounts::refresh,
        handlers::mailbox::inbox,
        handlers::mailbox::compose_form,
        handlers::mailbox::compose,
        handlers::api::list_mailboxes,
        handlers::api::list_messages,
        handlers::api::create_mailbox,
    ),
    components(schemas(
        ErrorBody,
        LoginRequest,
        RefreshRequest,
        RegisterRequest,
        CreateMailboxRequest,
        ComposeForm,
        ComposeFields,
        TokenResponse,
        UserInfo,
        MailboxCreatedResponse,
        MailboxResponse,
        MailboxListResponse,
        MessageResponse,
        MessageListResponse,
        InboxResponse,
        ComposeContextResponse,
        DeliveryResponse,
        ComposeResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "accounts", description = "Login, logout, registration"),
        (name = "mailbox", description = "Inbox and compose"),
        (name = "api", description = "Mailbox administration and listings"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// GET /api/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/accounts/login/",
            "/accounts/register/",
            "/inbox/",
            "/compose/",
            "/api/mailboxes/",
            "/api/messages/",
            "/api/mailboxes/create/",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(doc
            .components
            .unwrap()
            .security_schemes
            .contains_key("bearer_auth"));
    }
}
