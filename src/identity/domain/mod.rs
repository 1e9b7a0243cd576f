//! Domain model for user identities and their credentials.
//!
//! Values here are validated at construction so that services and adapters
//! only ever handle normalized emails, policy-conforming passwords, and
//! well-formed password hashes.

mod email;
mod error;
mod identity;
mod ids;
mod password;

pub use email::{DisplayName, EmailAddress};
pub use error::{IdentityDomainError, PasswordPolicyViolation};
pub use identity::{Identity, PersistedIdentityData};
pub use ids::IdentityId;
pub use password::{PasswordHash, PasswordHasher, PasswordPolicy};
