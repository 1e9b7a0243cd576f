//! The task data sent for enrichment.

use crate::identity::domain::IdentityId;
use crate::task::domain::{Task, TaskId};

/// Snapshot of a task taken when enrichment is scheduled.
///
/// The identifiers are only used for the audit trail; the provider sees the
/// title and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentSubject {
    identity_id: IdentityId,
    task_id: TaskId,
    title: String,
    description: Option<String>,
}

impl EnrichmentSubject {
    /// Creates a subject from raw parts.
    #[must_use]
    pub fn new(identity_id: IdentityId, task_id: TaskId, title: impl Into<String>) -> Self {
        Self {
            identity_id,
            task_id,
            title: title.into(),
            description: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Captures the fields of a stored task.
    #[must_use]
    pub fn for_task(task: &Task) -> Self {
        Self {
            identity_id: task.owner_id(),
            task_id: task.id(),
            title: task.title().as_str().to_owned(),
            description: task.description().map(|d| d.as_str().to_owned()),
        }
    }

    /// Returns the task owner.
    #[must_use]
    pub const fn identity_id(&self) -> IdentityId {
        self.identity_id
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
