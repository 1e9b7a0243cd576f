//! Identity aggregate root.

use super::{DisplayName, EmailAddress, IdentityId, PasswordHash};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    id: IdentityId,
    email: EmailAddress,
    password_hash: PasswordHash,
    display_name: DisplayName,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedIdentityData {
    /// Persisted identity identifier.
    pub id: IdentityId,
    /// Persisted normalized email.
    pub email: EmailAddress,
    /// Persisted encoded password hash.
    pub password_hash: PasswordHash,
    /// Persisted display name.
    pub display_name: DisplayName,
    /// Whether the account may authenticate.
    pub active: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Registers a new, active identity.
    ///
    /// When no display name is supplied the email local part is used.
    #[must_use]
    pub fn register(
        email: EmailAddress,
        password_hash: PasswordHash,
        display_name: Option<DisplayName>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        let name = display_name.unwrap_or_else(|| DisplayName::from_email(&email));
        Self {
            id: IdentityId::new(),
            email,
            password_hash,
            display_name: name,
            active: true,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an identity from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedIdentityData) -> Self {
        Self {
            id: data.id,
            email: data.email,
            password_hash: data.password_hash,
            display_name: data.display_name,
            active: data.active,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the identity identifier.
    #[must_use]
    pub const fn id(&self) -> IdentityId {
        self.id
    }

    /// Returns the normalized email.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the encoded password hash.
    #[must_use]
    pub const fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Returns the display name.
    #[must_use]
    pub const fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Returns whether the account may authenticate.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Disables the account. Deactivating twice is a no-op apart from the
    /// timestamp.
    pub fn deactivate(&mut self, clock: &impl Clock) {
        self.active = false;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc().max(self.updated_at);
    }
}
