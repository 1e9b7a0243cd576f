//! Session boundary: resolves bearer tokens before protected handlers run.

use super::error::ApiError;
use super::routes::AppState;
use crate::identity::domain::IdentityId;
use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

/// The identity behind an authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedIdentity(pub IdentityId);

/// Extracts the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; the token must be non-empty.
#[must_use]
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, rest) = header.trim().split_once(' ')?;
    let token = rest.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware rejecting requests without a valid access token.
///
/// On success the [`AuthenticatedIdentity`] is stored in the request
/// extensions.
///
/// # Errors
///
/// Returns an `UNAUTHENTICATED` error when the header is missing, malformed,
/// or carries an invalid, expired, or refresh token.
pub async fn require_identity(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer)
        .ok_or_else(ApiError::unauthenticated)?;

    let identity_id = state.credentials.verify_token(token)?;
    request
        .extensions_mut()
        .insert(AuthenticatedIdentity(identity_id));
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .ok_or_else(ApiError::unauthenticated)
    }
}
