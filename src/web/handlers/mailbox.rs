//! Inbox and compose handlers.

use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::mail::Attachment;
use crate::mailbox::{ComposeRequest, ComposeService, MailboxService};
use crate::web::dto::{
    ComposeContextResponse, ComposeFields, ComposeResponse, InboxResponse, MessageResponse,
    ValidatedJsonOrForm,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /inbox/ - The caller's INBOX, newest first.
#[utoipa::path(
    get,
    path = "/inbox/",
    tag = "mailbox",
    responses(
        (status = 200, description = "INBOX messages", body = InboxResponse),
        (status = 401, description = "Unauthorized", body = crate::web::error::ErrorBody),
        (status = 404, description = "Caller has no mailbox", body = crate::web::error::ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn inbox(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<InboxResponse>, ApiError> {
    let (mailbox, messages) = MailboxService::new(&state.db, &state.domain)
        .inbox(user.user_id())
        .await?;

    Ok(Json(InboxResponse {
        mailbox: mailbox.address,
        messages: messages.into_iter().map(MessageResponse::from).collect(),
    }))
}

/// GET /compose/ - Data for the compose form.
#[utoipa::path(
    get,
    path = "/compose/",
    tag = "mailbox",
    responses(
        (status = 200, description = "Compose context", body = ComposeContextResponse),
        (status = 401, description = "Unauthorized", body = crate::web::error::ErrorBody),
        (status = 404, description = "Caller has no mailbox", body = crate::web::error::ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn compose_form(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ComposeContextResponse>, ApiError> {
    let mailbox = MailboxService::new(&state.db, &state.domain)
        .mailbox_for(user.user_id())
        .await?;

    Ok(Json(ComposeContextResponse {
        from: mailbox.address,
        max_attachment_size: state.max_attachment_size,
    }))
}

/// POST /compose/ - Store the message in `Sent` and hand it to the relay.
///
/// Attachments need `multipart/form-data`; plain sends may also be posted
/// as a urlencoded form or JSON ([`ComposeFields`]).
#[utoipa::path(
    post,
    path = "/compose/",
    tag = "mailbox",
    request_body(content = crate::web::dto::ComposeForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Message sent", body = ComposeResponse),
        (status = 400, description = "Invalid recipients or form", body = crate::web::error::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::web::error::ErrorBody),
        (status = 404, description = "Caller has no mailbox", body = crate::web::error::ErrorBody),
        (status = 502, description = "Relay refused or unreachable; stored as failed", body = crate::web::error::ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn compose(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    request: Request,
) -> Result<(StatusCode, Json<ComposeResponse>), ApiError> {
    let request = read_compose_request(request, state.max_attachment_size).await?;

    if request.to.trim().is_empty() {
        return Err(ApiError::field("to", "This field is required."));
    }

    let outcome = ComposeService::new(&state.db, state.sender.as_ref())
        .send(user.user_id(), request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ComposeResponse {
            message: MessageResponse::from(outcome.message),
            delivery: outcome.receipt.into(),
        }),
    ))
}

/// Read the compose input from a multipart, urlencoded or JSON body.
async fn read_compose_request(
    request: Request,
    max_attachment_size: usize,
) -> Result<ComposeRequest, ApiError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"));

    if is_multipart {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e.body_text())))?;
        return read_compose_form(multipart, max_attachment_size).await;
    }

    let ValidatedJsonOrForm(fields) =
        ValidatedJsonOrForm::<ComposeFields>::from_request(request, &()).await?;

    Ok(ComposeRequest {
        to: fields.to,
        subject: fields.subject,
        body: fields.body,
        attachments: Vec::new(),
    })
}

/// Collect the `to`, `subject`, `body` and `attachments` parts.
///
/// Unknown parts are ignored, as are empty file parts without a filename
/// (what browsers submit for an untouched file input).
async fn read_compose_form(
    mut multipart: Multipart,
    max_attachment_size: usize,
) -> Result<ComposeRequest, ApiError> {
    let mut request = ComposeRequest::default();
    let mut total_size = 0usize;

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "to" => request.to = field.text().await.map_err(invalid_form)?,
            "subject" => request.subject = field.text().await.map_err(invalid_form)?,
            "body" => request.body = field.text().await.map_err(invalid_form)?,
            "attachments" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await.map_err(invalid_form)?;
                if filename.is_empty() && content.is_empty() {
                    continue;
                }

                total_size += content.len();
                if total_size > max_attachment_size {
                    return Err(ApiError::field(
                        "attachments",
                        format!(
                            "Attachments exceed the {} MB limit.",
                            max_attachment_size / (1024 * 1024)
                        ),
                    ));
                }

                let filename = if filename.is_empty() {
                    "attachment".to_string()
                } else {
                    filename
                };
                request
                    .attachments
                    .push(Attachment::new(filename, content.to_vec()));
            }
            other => tracing::debug!(field = other, "Ignoring unknown compose field"),
        }
    }

    Ok(request)
}

fn invalid_form(e: MultipartError) -> ApiError {
    ApiError::bad_request(format!("Invalid form data: {}", e.body_text()))
}
