//! Port contracts for enrichment.
//!
//! [`InferenceClient`] and [`AuditLog`] are the gateway's outbound seams;
//! [`Enricher`] is what the task service depends on.

pub mod audit_log;
pub mod enricher;
pub mod inference;

pub use audit_log::{AuditLog, AuditLogError};
pub use enricher::Enricher;
pub use inference::{InferenceClient, InferenceError};

#[cfg(test)]
pub use inference::MockInferenceClient;
