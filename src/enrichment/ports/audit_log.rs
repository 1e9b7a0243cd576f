//! Append-only store of enrichment attempts.

use crate::enrichment::domain::AuditRecord;
use crate::task::domain::TaskId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by audit log implementations.
#[derive(Debug, Clone, Error)]
pub enum AuditLogError {
    /// Persistence-layer failure.
    #[error("audit persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuditLogError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Audit record persistence contract.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Appends a record.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError::Persistence`] when the record cannot be
    /// written.
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditLogError>;

    /// Returns every record for a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError::Persistence`] when the lookup fails.
    async fn records_for_task(&self, task_id: TaskId) -> Result<Vec<AuditRecord>, AuditLogError>;
}
