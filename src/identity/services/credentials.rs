//! Registration, authentication, and token handling for identities.

use super::tokens::{TokenError, TokenIssuer, TokenKind, TokenPair};
use crate::identity::{
    domain::{
        DisplayName, EmailAddress, Identity, IdentityDomainError, IdentityId, PasswordHasher,
        PasswordPolicy,
    },
    ports::{IdentityRepository, IdentityRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for registering a new identity.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    email: String,
    password: String,
    display_name: Option<String>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

impl RegisterRequest {
    /// Creates a request with the required credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            display_name: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// Settings shared by every credential operation.
#[derive(Debug, Clone)]
pub struct CredentialSettings {
    /// Registration password rules.
    pub policy: PasswordPolicy,
    /// Password hasher and its work factor.
    pub hasher: PasswordHasher,
    /// Token signer.
    pub tokens: TokenIssuer,
}

/// Service-level errors for credential operations.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] IdentityDomainError),
    /// The email is already registered.
    #[error("email already registered")]
    Conflict,
    /// Email or password did not match an active identity.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// A bearer or refresh token was rejected.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] IdentityRepositoryError),
    /// The blocking hash worker failed.
    #[error("password hashing failed: {0}")]
    Hashing(#[source] tokio::task::JoinError),
    /// Token signing failed.
    #[error(transparent)]
    TokenEncoding(TokenError),
}

/// Result type for credential service operations.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Credential store and verifier.
pub struct CredentialService<R, C>
where
    R: IdentityRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    settings: CredentialSettings,
}

impl<R, C> Clone for CredentialService<R, C>
where
    R: IdentityRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            settings: self.settings.clone(),
        }
    }
}

impl<R, C> CredentialService<R, C>
where
    R: IdentityRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new credential service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>, settings: CredentialSettings) -> Self {
        Self {
            repository,
            clock,
            settings,
        }
    }

    /// Registers a new identity.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Domain`] when the email, display name, or
    /// password is invalid, [`CredentialError::Conflict`] when the email is
    /// already registered, or [`CredentialError::Repository`] when
    /// persistence fails.
    pub async fn register(&self, request: RegisterRequest) -> CredentialResult<Identity> {
        let RegisterRequest {
            email,
            password,
            display_name,
        } = request;

        let email = EmailAddress::new(email)?;
        let display_name = display_name.map(DisplayName::new).transpose()?;
        self.settings.policy.check(&password)?;

        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(CredentialError::Conflict);
        }

        let hasher = self.settings.hasher;
        let password_hash = run_hasher(move || hasher.hash(&password)).await?;
        let identity = Identity::register(email, password_hash, display_name, &*self.clock);

        match self.repository.store(&identity).await {
            Ok(()) => {}
            Err(IdentityRepositoryError::DuplicateEmail(_)) => {
                return Err(CredentialError::Conflict);
            }
            Err(err) => return Err(err.into()),
        }

        info!(identity_id = %identity.id(), "identity registered");
        Ok(identity)
    }

    /// Verifies an email and password pair.
    ///
    /// Unknown emails still pay for a full hash derivation.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidCredentials`] for unknown emails,
    /// wrong passwords, and inactive identities alike.
    pub async fn authenticate(&self, email: &str, password: &str) -> CredentialResult<Identity> {
        let hasher = self.settings.hasher;
        let candidate = password.to_owned();

        let found = match EmailAddress::new(email) {
            Ok(address) => self.repository.find_by_email(&address).await?,
            Err(_) => None,
        };

        let Some(identity) = found else {
            run_hasher(move || hasher.verify_dummy(&candidate)).await?;
            debug!("authentication rejected: unknown email");
            return Err(CredentialError::InvalidCredentials);
        };

        let stored = identity.password_hash().clone();
        let matches = run_hasher(move || hasher.verify(&candidate, &stored)).await?;
        if !matches {
            debug!(identity_id = %identity.id(), "authentication rejected: password mismatch");
            return Err(CredentialError::InvalidCredentials);
        }
        if !identity.is_active() {
            debug!(identity_id = %identity.id(), "authentication rejected: inactive identity");
            return Err(CredentialError::InvalidCredentials);
        }

        Ok(identity)
    }

    /// Issues an access and refresh token pair.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::TokenEncoding`] when the tokens cannot be issued.
    pub fn issue_token(&self, identity: &Identity) -> CredentialResult<TokenPair> {
        self.settings
            .tokens
            .issue(identity.id(), &*self.clock)
            .map_err(CredentialError::TokenEncoding)
    }

    /// Resolves an access token to the identity it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Unauthenticated`] when the token is
    /// malformed, expired, badly signed, or a refresh token.
    pub fn verify_token(&self, token: &str) -> CredentialResult<IdentityId> {
        self.settings
            .tokens
            .verify(token, TokenKind::Access)
            .map_err(|err| CredentialError::Unauthenticated(err.to_string()))
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Unauthenticated`] when the token is invalid,
    /// is an access token, or names a missing or inactive identity.
    pub async fn refresh(&self, refresh_token: &str) -> CredentialResult<TokenPair> {
        let identity_id = self
            .settings
            .tokens
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|err| CredentialError::Unauthenticated(err.to_string()))?;
        let identity = self.current_identity(identity_id).await?;
        self.issue_token(&identity)
    }

    /// Loads the identity behind an authenticated request.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Unauthenticated`] when the identity no
    /// longer exists or has been deactivated.
    pub async fn current_identity(&self, identity_id: IdentityId) -> CredentialResult<Identity> {
        match self.repository.find_by_id(identity_id).await? {
            Some(identity) if identity.is_active() => Ok(identity),
            Some(_) => Err(CredentialError::Unauthenticated(
                "identity is inactive".to_owned(),
            )),
            None => Err(CredentialError::Unauthenticated(
                "identity no longer exists".to_owned(),
            )),
        }
    }

    /// Soft-disables an identity.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Repository`] with
    /// [`IdentityRepositoryError::NotFound`] when the identity does not exist.
    pub async fn deactivate(&self, identity_id: IdentityId) -> CredentialResult<Identity> {
        let mut identity = self
            .repository
            .find_by_id(identity_id)
            .await?
            .ok_or(IdentityRepositoryError::NotFound(identity_id))?;
        identity.deactivate(&*self.clock);
        self.repository.update(&identity).await?;
        info!(identity_id = %identity_id, "identity deactivated");
        Ok(identity)
    }
}

async fn run_hasher<F, T>(f: F) -> CredentialResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(CredentialError::Hashing)
}
