//! Account handlers: login, logout, registration, token refresh.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::auth::{register as register_account, verify_password, RegistrationRequest};
use crate::db::{RefreshTokenRepository, UserStore};
use crate::web::dto::{
    LoginRequest, MailboxCreatedResponse, RefreshRequest, RegisterRequest, TokenResponse,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// POST /accounts/login/ - Log in with username and password.
#[utoipa::path(
    post,
    path = "/accounts/login/",
    tag = "accounts",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session tokens", body = TokenResponse),
        (status = 400, description = "Missing fields", body = crate::web::error::ErrorBody),
        (status = 401, description = "Wrong credentials", body = crate::web::error::ErrorBody),
        (status = 403, description = "Account disabled", body = crate::web::error::ErrorBody)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .db
        .get_user_by_username(req.username.trim())
        .await?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    verify_password(&req.password, &user.password)
        .map_err(|_| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    if !user.is_active {
        return Err(ApiError::forbidden("Account is disabled"));
    }

    let tokens = state.issue_tokens(&user).await?;

    if let Err(e) = state.db.touch_last_login(user.id).await {
        tracing::warn!(user_id = user.id, error = %e, "Failed to update last login");
    }

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");
    Ok(Json(tokens))
}

/// POST /accounts/logout/ - Revoke every refresh token of the caller.
#[utoipa::path(
    post,
    path = "/accounts/logout/",
    tag = "accounts",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Unauthorized", body = crate::web::error::ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<StatusCode, ApiError> {
    let revoked = RefreshTokenRepository::new(state.db.pool())
        .revoke_all_for_user(user.user_id())
        .await?;

    tracing::info!(user_id = user.user_id(), revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /accounts/register/ - Create an account with its mailbox and log in.
#[utoipa::path(
    post,
    path = "/accounts/register/",
    tag = "accounts",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account and mailbox created", body = TokenResponse),
        (status = 400, description = "Invalid input or name taken", body = crate::web::error::ErrorBody)
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let request = RegistrationRequest::new(req.username.trim(), req.email.trim(), req.password)
        .with_confirmation(req.password_confirm);

    let (user, mailbox) = register_account(&state.db, &state.domain, request).await?;

    let mut tokens = state.issue_tokens(&user).await?;
    tokens.mailbox = Some(MailboxCreatedResponse::from(&mailbox));

    Ok((StatusCode::CREATED, Json(tokens)))
}

/// POST /accounts/refresh/ - Exchange a refresh token for a new pair.
#[utoipa::path(
    post,
    path = "/accounts/refresh/",
    tag = "accounts",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New session tokens", body = TokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = crate::web::error::ErrorBody),
        (status = 403, description = "Account disabled", body = crate::web::error::ErrorBody)
    )
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let repo = RefreshTokenRepository::new(state.db.pool());

    let token = repo
        .get_valid_token(&req.refresh_token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired refresh token"))?;

    let user = state
        .db
        .get_user(token.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired refresh token"))?;

    if !user.is_active {
        return Err(ApiError::forbidden("Account is disabled"));
    }

    // Rotation: the presented token is single-use
    if !repo.revoke(&token.token).await? {
        return Err(ApiError::unauthorized("Invalid or expired refresh token"));
    }

    let mut tokens = state.issue_tokens(&user).await?;
    tokens.user = None;

    Ok(Json(tokens))
}
