//! `PostgreSQL`-backed audit log.

use super::{models::AuditRow, schema::enrichment_audit};
use crate::enrichment::{
    domain::{AuditOutcome, AuditRecord},
    ports::{AuditLog, AuditLogError},
};
use crate::identity::domain::IdentityId;
use crate::task::domain::TaskId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type used by the audit log.
pub type AuditPgPool = Pool<ConnectionManager<PgConnection>>;

/// Append-only audit log stored in `enrichment_audit`.
#[derive(Debug, Clone)]
pub struct PostgresAuditLog {
    pool: AuditPgPool,
}

impl PostgresAuditLog {
    /// Creates a log from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: AuditPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> Result<T, AuditLogError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, AuditLogError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(AuditLogError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(AuditLogError::persistence)?
    }
}

#[async_trait]
impl AuditLog for PostgresAuditLog {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditLogError> {
        let row = AuditRow {
            id: record.id,
            recorded_at: record.recorded_at,
            identity_id: record.identity_id.into_inner(),
            task_id: record.task_id.into_inner(),
            outcome: record.outcome.as_str().to_owned(),
            latency_ms: i64::try_from(record.latency_ms).unwrap_or(i64::MAX),
            detail: record.detail.clone(),
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(enrichment_audit::table)
                .values(&row)
                .execute(connection)
                .map_err(AuditLogError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn records_for_task(&self, task_id: TaskId) -> Result<Vec<AuditRecord>, AuditLogError> {
        self.run_blocking(move |connection| {
            let rows = enrichment_audit::table
                .filter(enrichment_audit::task_id.eq(task_id.into_inner()))
                .order((enrichment_audit::recorded_at.asc(), enrichment_audit::id.asc()))
                .select(AuditRow::as_select())
                .load::<AuditRow>(connection)
                .map_err(AuditLogError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }
}

fn row_to_record(row: AuditRow) -> Result<AuditRecord, AuditLogError> {
    Ok(AuditRecord {
        id: row.id,
        recorded_at: row.recorded_at,
        identity_id: IdentityId::from_uuid(row.identity_id),
        task_id: TaskId::from_uuid(row.task_id),
        outcome: AuditOutcome::try_from(row.outcome.as_str())
            .map_err(AuditLogError::persistence)?,
        latency_ms: u64::try_from(row.latency_ms).map_err(AuditLogError::persistence)?,
        detail: row.detail,
    })
}
