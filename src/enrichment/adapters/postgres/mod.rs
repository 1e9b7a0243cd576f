//! `PostgreSQL` audit log adapter.

mod audit_log;
mod models;
mod schema;

pub use audit_log::{AuditPgPool, PostgresAuditLog};
