//! `PostgreSQL` identity adapter.

mod models;
mod repository;
mod schema;

pub use repository::{IdentityPgPool, PostgresIdentityRepository};
