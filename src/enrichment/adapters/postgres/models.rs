//! Diesel row model for audit records.

use super::schema::enrichment_audit;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Audit row used for both inserts and reads.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = enrichment_audit)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuditRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// When the attempt finished.
    pub recorded_at: DateTime<Utc>,
    /// Owner of the enriched task.
    pub identity_id: uuid::Uuid,
    /// Enriched task.
    pub task_id: uuid::Uuid,
    /// Outcome label.
    pub outcome: String,
    /// Elapsed milliseconds.
    pub latency_ms: i64,
    /// Failure detail.
    pub detail: Option<String>,
}
