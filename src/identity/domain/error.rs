//! Error types for identity domain validation.

use thiserror::Error;

/// Errors returned while constructing identity domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityDomainError {
    /// The email address is not of the form `local@domain.tld`.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The email address exceeds the persisted column width.
    #[error(
        "email address is {0} characters long, the maximum is {max}",
        max = super::EmailAddress::MAX_LENGTH
    )]
    EmailTooLong(usize),

    /// The display name is empty after trimming or exceeds its limit.
    #[error(
        "display name must be between 1 and {max} characters",
        max = super::DisplayName::MAX_LENGTH
    )]
    InvalidDisplayName,

    /// The password does not satisfy the configured policy.
    #[error("password rejected: {0}")]
    WeakPassword(PasswordPolicyViolation),
}

impl IdentityDomainError {
    /// Returns the request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) | Self::EmailTooLong(_) => "email",
            Self::InvalidDisplayName => "display_name",
            Self::WeakPassword(_) => "password",
        }
    }
}

/// The first password policy rule a candidate password failed.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PasswordPolicyViolation {
    /// Fewer characters than the policy minimum.
    #[error("must be at least {0} characters long")]
    TooShort(usize),
    /// No uppercase letter.
    #[error("must contain an uppercase letter")]
    MissingUppercase,
    /// No lowercase letter.
    #[error("must contain a lowercase letter")]
    MissingLowercase,
    /// No decimal digit.
    #[error("must contain a digit")]
    MissingDigit,
}
