//! Port definitions for identity persistence.

mod repository;

pub use repository::{IdentityRepository, IdentityRepositoryError, IdentityRepositoryResult};
