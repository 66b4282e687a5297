//! JSON API handlers under `/api/`.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::mailbox::MailboxService;
use crate::web::dto::{
    CreateMailboxRequest, MailboxCreatedResponse, MailboxListResponse, MailboxResponse,
    MessageListResponse, MessageResponse, ValidatedJsonOrForm,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /api/mailboxes/ - Every mailbox with its owner.
///
/// Any logged-in user sees the full list.
#[utoipa::path(
    get,
    path = "/api/mailboxes/",
    tag = "api",
    responses(
        (status = 200, description = "All mailboxes", body = MailboxListResponse),
        (status = 401, description = "Unauthorized", body = crate::web::error::ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_mailboxes(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<Json<MailboxListResponse>, ApiError> {
    let mailboxes = MailboxService::new(&state.db, &state.domain)
        .list_all()
        .await?;

    Ok(Json(MailboxListResponse {
        mailboxes: mailboxes.into_iter().map(MailboxResponse::from).collect(),
    }))
}

/// GET /api/messages/ - The caller's messages in every folder.
#[utoipa::path(
    get,
    path = "/api/messages/",
    tag = "api",
    responses(
        (status = 200, description = "Caller's messages", body = MessageListResponse),
        (status = 401, description = "Unauthorized", body = crate::web::error::ErrorBody),
        (status = 404, description = "Caller has no mailbox", body = crate::web::error::ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<MessageListResponse>, ApiError> {
    let messages = MailboxService::new(&state.db, &state.domain)
        .messages(user.user_id())
        .await?;

    Ok(Json(MessageListResponse {
        messages: messages.into_iter().map(MessageResponse::from).collect(),
    }))
}

/// POST /api/mailboxes/create/ - Provision a user and mailbox.
#[utoipa::path(
    post,
    path = "/api/mailboxes/create/",
    tag = "api",
    request_body(content = CreateMailboxRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Mailbox created", body = MailboxCreatedResponse),
        (status = 400, description = "Mailbox already exists or invalid username", body = crate::web::error::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::web::error::ErrorBody),
        (status = 405, description = "POST required", body = crate::web::error::ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_mailbox(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJsonOrForm(req): ValidatedJsonOrForm<CreateMailboxRequest>,
) -> Result<Json<MailboxCreatedResponse>, ApiError> {
    let mailbox = MailboxService::new(&state.db, &state.domain)
        .provision(&req.username, req.password.as_deref())
        .await?;

    tracing::info!(
        by = %user.0.username,
        address = %mailbox.address,
        "Mailbox created through API"
    );

    Ok(Json(MailboxCreatedResponse::from(&mailbox)))
}

/// Any method other than POST on the provisioning endpoint.
pub async fn post_required(_user: AuthUser) -> ApiError {
    ApiError::method_not_allowed("POST required")
}
