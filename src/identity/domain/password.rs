//! Password policy and PBKDF2-HMAC-SHA256 password hashing.
//!
//! Hashes are stored in a self-describing text form:
//!
//! ```text
//! pbkdf2_sha256$<iterations>$<salt hex>$<derived key hex>
//! ```
//!
//! so the iteration count can be raised without invalidating existing
//! hashes.

use super::{IdentityDomainError, PasswordPolicyViolation};
use rand::RngCore;
use sha2::Sha256;
use std::fmt;

const SCHEME: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Rules a plaintext password must satisfy at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    min_length: usize,
    require_uppercase: bool,
    require_lowercase: bool,
    require_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 12,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
        }
    }
}

impl PasswordPolicy {
    /// Creates a policy with the given minimum length and every character
    /// class requirement enabled.
    #[must_use]
    pub const fn with_min_length(min_length: usize) -> Self {
        Self {
            min_length,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
        }
    }

    /// Toggles the uppercase requirement.
    #[must_use]
    pub const fn require_uppercase(mut self, required: bool) -> Self {
        self.require_uppercase = required;
        self
    }

    /// Toggles the lowercase requirement.
    #[must_use]
    pub const fn require_lowercase(mut self, required: bool) -> Self {
        self.require_lowercase = required;
        self
    }

    /// Toggles the digit requirement.
    #[must_use]
    pub const fn require_digit(mut self, required: bool) -> Self {
        self.require_digit = required;
        self
    }

    /// Returns the minimum password length in characters.
    #[must_use]
    pub const fn min_length(&self) -> usize {
        self.min_length
    }

    /// Checks a candidate password against the policy.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::WeakPassword`] describing the first
    /// rule the password fails.
    pub fn check(&self, password: &str) -> Result<(), IdentityDomainError> {
        let violation = if password.chars().count() < self.min_length {
            Some(PasswordPolicyViolation::TooShort(self.min_length))
        } else if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            Some(PasswordPolicyViolation::MissingUppercase)
        } else if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            Some(PasswordPolicyViolation::MissingLowercase)
        } else if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            Some(PasswordPolicyViolation::MissingDigit)
        } else {
            None
        };

        violation.map_or(Ok(()), |v| Err(IdentityDomainError::WeakPassword(v)))
    }
}

/// An encoded, salted password hash.
///
/// The plaintext is never retained. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps an encoded hash loaded from storage.
    #[must_use]
    pub const fn from_encoded(encoded: String) -> Self {
        Self(encoded)
    }

    /// Returns the encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn decode(&self) -> Option<DecodedHash> {
        let mut parts = self.0.split('$');
        let scheme = parts.next()?;
        let iterations = parts.next()?.parse::<u32>().ok()?;
        let salt = hex::decode(parts.next()?).ok()?;
        let key = hex::decode(parts.next()?).ok()?;
        if scheme != SCHEME || parts.next().is_some() || iterations == 0 || key.is_empty() {
            return None;
        }
        Some(DecodedHash {
            iterations,
            salt,
            key,
        })
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

struct DecodedHash {
    iterations: u32,
    salt: Vec<u8>,
    key: Vec<u8>,
}

/// PBKDF2-HMAC-SHA256 hasher with a fixed work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    /// Iteration count used when none is configured.
    pub const DEFAULT_ITERATIONS: u32 = 29_000;

    /// Creates a hasher. An iteration count of zero is raised to one.
    #[must_use]
    pub const fn new(iterations: u32) -> Self {
        Self {
            iterations: if iterations == 0 { 1 } else { iterations },
        }
    }

    /// Returns the configured iteration count.
    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hashes a plaintext password with a fresh random salt.
    #[must_use]
    pub fn hash(&self, password: &str) -> PasswordHash {
        let mut salt = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let key = derive(password, &salt, self.iterations);
        PasswordHash(format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(key)
        ))
    }

    /// Verifies a plaintext password against an encoded hash.
    ///
    /// The iteration count stored in the hash is used, not the hasher's own.
    /// Malformed hashes never verify.
    #[must_use]
    pub fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        let Some(decoded) = hash.decode() else {
            return false;
        };
        let mut candidate = vec![0_u8; decoded.key.len()];
        pbkdf2::pbkdf2_hmac::<Sha256>(
            password.as_bytes(),
            &decoded.salt,
            decoded.iterations,
            &mut candidate,
        );
        constant_time_eq(&candidate, &decoded.key)
    }

    /// Spends the same work as a real verification and discards the result.
    ///
    /// Used when the account does not exist, so response timing does not
    /// reveal which emails are registered.
    pub fn verify_dummy(&self, password: &str) {
        let key = derive(password, &[0_u8; SALT_LEN], self.iterations);
        std::hint::black_box(key);
    }
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0_u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0_u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
