//! Repository port for identity persistence and lookup.

use crate::identity::domain::{EmailAddress, Identity, IdentityId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for identity repository operations.
pub type IdentityRepositoryResult<T> = Result<T, IdentityRepositoryError>;

/// Identity persistence contract.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Stores a newly registered identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityRepositoryError::DuplicateEmail`] when the email is
    /// already registered or [`IdentityRepositoryError::DuplicateIdentity`]
    /// when the identifier already exists.
    async fn store(&self, identity: &Identity) -> IdentityRepositoryResult<()>;

    /// Persists changes to an existing identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityRepositoryError::NotFound`] when the identity does
    /// not exist.
    async fn update(&self, identity: &Identity) -> IdentityRepositoryResult<()>;

    /// Finds an identity by identifier.
    ///
    /// Returns `None` when the identity does not exist.
    async fn find_by_id(&self, id: IdentityId) -> IdentityRepositoryResult<Option<Identity>>;

    /// Finds an identity by normalized email.
    ///
    /// Returns `None` when no identity uses the email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> IdentityRepositoryResult<Option<Identity>>;
}

/// Errors returned by identity repository implementations.
#[derive(Debug, Clone, Error)]
pub enum IdentityRepositoryError {
    /// An identity with the same identifier already exists.
    #[error("duplicate identity identifier: {0}")]
    DuplicateIdentity(IdentityId),

    /// The email is already registered.
    #[error("email already registered: {0}")]
    DuplicateEmail(EmailAddress),

    /// The identity was not found.
    #[error("identity not found: {0}")]
    NotFound(IdentityId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl IdentityRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
