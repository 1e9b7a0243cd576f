//! Append-only audit records of enrichment attempts.

use super::EnrichmentSubject;
use crate::identity::domain::IdentityId;
use crate::task::domain::TaskId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// How an enrichment attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// A suggestion was parsed.
    Success,
    /// The call timed out or was refused by the rate limiter.
    Timeout,
    /// Transport, provider, or parse failure.
    Error,
}

impl AuditOutcome {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Timeout => "timeout",
            Self::Error => "error",
        }
    }
}

/// Error returned while parsing audit outcomes from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown audit outcome: {0}")]
pub struct ParseAuditOutcomeError(pub String);

impl TryFrom<&str> for AuditOutcome {
    type Error = ParseAuditOutcomeError;

    fn try_from(value: &str) -> Result<Self, ParseAuditOutcomeError> {
        match value {
            "success" => Ok(Self::Success),
            "timeout" => Ok(Self::Timeout),
            "error" => Ok(Self::Error),
            _ => Err(ParseAuditOutcomeError(value.to_owned())),
        }
    }
}

/// One enrichment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Record identifier.
    pub id: Uuid,
    /// When the attempt finished.
    pub recorded_at: DateTime<Utc>,
    /// Owner of the enriched task.
    pub identity_id: IdentityId,
    /// The enriched task.
    pub task_id: TaskId,
    /// How the attempt ended.
    pub outcome: AuditOutcome,
    /// Wall-clock time spent, in milliseconds.
    pub latency_ms: u64,
    /// Failure detail, if any. Never contains credentials.
    pub detail: Option<String>,
}

impl AuditRecord {
    /// Creates a record for an attempt on `subject`.
    #[must_use]
    pub fn new(
        subject: &EnrichmentSubject,
        outcome: AuditOutcome,
        latency: Duration,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: clock.utc(),
            identity_id: subject.identity_id(),
            task_id: subject.task_id(),
            outcome,
            latency_ms: u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            detail: None,
        }
    }

    /// Attaches a failure detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
