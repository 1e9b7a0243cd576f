//! HS256 bearer token issuance and verification.

use crate::identity::domain::IdentityId;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Distinguishes short-lived access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Presented on every protected request.
    Access,
    /// Exchanged for a new token pair.
    Refresh,
}

impl TokenKind {
    /// Returns the claim value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
    jti: Uuid,
    typ: TokenKind,
}

/// Access and refresh token pair returned by login, register, and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Bearer token for protected requests.
    pub access_token: String,
    /// Token accepted only by the refresh operation.
    pub refresh_token: String,
    /// Always `bearer`.
    pub token_type: String,
    /// Expiry of the access token.
    pub expires_at: DateTime<Utc>,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Token lifetimes and verification leeway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSettings {
    /// Access token lifetime.
    pub access_ttl: Duration,
    /// Refresh token lifetime.
    pub refresh_ttl: Duration,
    /// Clock skew tolerated when checking `exp`, in seconds.
    pub leeway_secs: u64,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(30),
            refresh_ttl: Duration::days(7),
            leeway_secs: 0,
        }
    }
}

/// Reasons a token is rejected or could not be produced.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Encoding(jsonwebtoken::errors::Error),
    /// Signature, structure, or expiry check failed.
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    /// The configured lifetime runs past the representable calendar.
    #[error("token lifetime overflows the calendar")]
    LifetimeOverflow,
    /// The token is valid but of the wrong kind.
    #[error("expected {expected} token, got {actual}")]
    WrongKind {
        /// Kind the caller required.
        expected: &'static str,
        /// Kind carried by the token.
        actual: &'static str,
    },
}

/// Signs and verifies bearer tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    settings: TokenSettings,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer for the given secret.
    #[must_use]
    pub fn new(secret: &[u8], settings: TokenSettings) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            settings,
        }
    }

    /// Returns the configured lifetimes.
    #[must_use]
    pub const fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Issues an access and refresh token for the identity.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::LifetimeOverflow`] when a lifetime cannot be
    /// added to the current time, and [`TokenError::Encoding`] when signing
    /// fails.
    pub fn issue(
        &self,
        identity_id: IdentityId,
        clock: &impl Clock,
    ) -> Result<TokenPair, TokenError> {
        let now = clock.utc();
        let expires_at = now
            .checked_add_signed(self.settings.access_ttl)
            .ok_or(TokenError::LifetimeOverflow)?;
        let refresh_expires_at = now
            .checked_add_signed(self.settings.refresh_ttl)
            .ok_or(TokenError::LifetimeOverflow)?;
        let access_token = self.sign(identity_id, TokenKind::Access, now, expires_at)?;
        let refresh_token = self.sign(identity_id, TokenKind::Refresh, now, refresh_expires_at)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "bearer".to_owned(),
            expires_at,
            expires_in: self.settings.access_ttl.num_seconds(),
        })
    }

    /// Verifies a token's signature, expiry, and kind, returning its subject.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for bad signatures, malformed or
    /// expired tokens, and [`TokenError::WrongKind`] when the token kind does
    /// not match `expected`.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<IdentityId, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.settings.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(TokenError::Invalid)?
            .claims;
        if claims.typ != expected {
            return Err(TokenError::WrongKind {
                expected: expected.as_str(),
                actual: claims.typ.as_str(),
            });
        }
        Ok(IdentityId::from_uuid(claims.sub))
    }

    fn sign(
        &self,
        identity_id: IdentityId,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: identity_id.into_inner(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            typ: kind,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encoding)
    }
}
