//! In-memory identity adapters for tests and single-process deployments.

mod identity;

pub use identity::InMemoryIdentityRepository;
