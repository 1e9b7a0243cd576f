//! In-memory audit log.

use crate::enrichment::{
    domain::AuditRecord,
    ports::{AuditLog, AuditLogError},
};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Thread-safe, append-only in-memory audit log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every record in append order.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError::Persistence`] when the lock is poisoned.
    pub fn all(&self) -> Result<Vec<AuditRecord>, AuditLogError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.clone())
    }
}

fn poisoned(err: impl ToString) -> AuditLogError {
    AuditLogError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditLogError> {
        let mut records = self.records.write().map_err(poisoned)?;
        records.push(record.clone());
        Ok(())
    }

    async fn records_for_task(&self, task_id: TaskId) -> Result<Vec<AuditRecord>, AuditLogError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records
            .iter()
            .filter(|record| record.task_id == task_id)
            .cloned()
            .collect())
    }
}
