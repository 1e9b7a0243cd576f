//! Registration, login, and token endpoints.

use super::envelope::ApiSuccess;
use super::error::ApiResult;
use super::extract::ApiJson;
use super::routes::AppState;
use super::session::AuthenticatedIdentity;
use super::types::{
    IdentityResponse, LoginBody, LogoutResponse, RefreshBody, RegisterBody, RegisterResponse,
};
use crate::identity::services::{RegisterRequest, TokenPair};
use axum::extract::State;
use std::sync::Arc;
use tracing::info;

/// `POST /api/v1/auth/register`
///
/// # Errors
///
/// `VALIDATION_ERROR` for a bad email, display name, or password and
/// `CONFLICT` for a registered email.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<RegisterBody>,
) -> ApiResult<ApiSuccess<RegisterResponse>> {
    let mut request = RegisterRequest::new(body.email, body.password);
    if let Some(display_name) = body.display_name {
        request = request.with_display_name(display_name);
    }

    let identity = state.credentials.register(request).await?;
    let tokens = state.credentials.issue_token(&identity)?;
    Ok(ApiSuccess::created(RegisterResponse {
        user: IdentityResponse::from(&identity),
        tokens,
    }))
}

/// `POST /api/v1/auth/login`
///
/// # Errors
///
/// `INVALID_CREDENTIALS` for any mismatch.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<LoginBody>,
) -> ApiResult<ApiSuccess<TokenPair>> {
    let identity = state
        .credentials
        .authenticate(&body.email, &body.password)
        .await?;
    let tokens = state.credentials.issue_token(&identity)?;
    info!(identity_id = %identity.id(), "login succeeded");
    Ok(ApiSuccess::ok(tokens))
}

/// `POST /api/v1/auth/refresh`
///
/// # Errors
///
/// `UNAUTHENTICATED` when the refresh token is invalid or its identity is
/// gone or inactive.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<RefreshBody>,
) -> ApiResult<ApiSuccess<TokenPair>> {
    let tokens = state.credentials.refresh(&body.refresh_token).await?;
    Ok(ApiSuccess::ok(tokens))
}

/// `GET /api/v1/auth/me`
///
/// # Errors
///
/// `UNAUTHENTICATED` when the identity is gone or inactive.
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthenticatedIdentity(identity_id): AuthenticatedIdentity,
) -> ApiResult<ApiSuccess<IdentityResponse>> {
    let identity = state.credentials.current_identity(identity_id).await?;
    Ok(ApiSuccess::ok(IdentityResponse::from(&identity)))
}

/// `POST /api/v1/auth/logout`
///
/// Tokens are not revoked server-side; the client discards them.
pub async fn logout(
    AuthenticatedIdentity(identity_id): AuthenticatedIdentity,
) -> ApiSuccess<LogoutResponse> {
    info!(identity_id = %identity_id, "logout acknowledged");
    ApiSuccess::ok(LogoutResponse { logged_out: true })
}
