//! Validated email address and display name values.

use super::IdentityDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized login email address.
///
/// Addresses are trimmed and lower-cased before validation, so two inputs
/// that differ only in case or surrounding whitespace map to the same
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Maximum stored length in characters.
    pub const MAX_LENGTH: usize = 255;

    /// Normalizes and validates an email address.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::EmailTooLong`] when the normalized
    /// address is longer than [`Self::MAX_LENGTH`], or
    /// [`IdentityDomainError::InvalidEmail`] when it lacks a single `@`, has
    /// an empty local part, or has a domain without a dot.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityDomainError> {
        let normalized = raw.as_ref().trim().to_lowercase();
        let length = normalized.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(IdentityDomainError::EmailTooLong(length));
        }

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(IdentityDomainError::InvalidEmail(normalized));
        };
        let domain_ok = domain.contains('.') && domain.split('.').all(|label| !label.is_empty());
        if local.is_empty()
            || domain.contains('@')
            || !domain_ok
            || normalized.chars().any(char::is_whitespace)
        {
            return Err(IdentityDomainError::InvalidEmail(normalized));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the part before the `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split_once('@').map_or(self.0.as_str(), |(local, _)| local)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human-readable name shown for an identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 255;

    /// Creates a trimmed, non-empty display name.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::InvalidDisplayName`] when the trimmed
    /// value is empty or longer than [`Self::MAX_LENGTH`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityDomainError> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if length == 0 || length > Self::MAX_LENGTH {
            return Err(IdentityDomainError::InvalidDisplayName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Derives a display name from the local part of an email address.
    #[must_use]
    pub fn from_email(email: &EmailAddress) -> Self {
        Self(email.local_part().to_owned())
    }

    /// Returns the display name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
