//! Credential store and verifier for Taskwright users.
//!
//! Identities are registered with a normalized email address and a salted
//! password hash. Authentication produces short-lived access tokens and
//! longer-lived refresh tokens signed with a server secret.
//!
//! # Architecture
//!
//! - **Domain**: [`domain::Identity`], [`domain::EmailAddress`],
//!   [`domain::PasswordPolicy`], and the PBKDF2 [`domain::PasswordHasher`]
//! - **Ports**: [`ports::IdentityRepository`]
//! - **Adapters**: [`adapters::memory::InMemoryIdentityRepository`] and
//!   [`adapters::postgres::PostgresIdentityRepository`]
//! - **Services**: [`services::CredentialService`] and [`services::TokenIssuer`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
