//! Application services for credentials and bearer tokens.

mod credentials;
mod tokens;

pub use credentials::{
    CredentialError, CredentialResult, CredentialService, CredentialSettings, RegisterRequest,
};
pub use tokens::{TokenError, TokenIssuer, TokenKind, TokenPair, TokenSettings};
