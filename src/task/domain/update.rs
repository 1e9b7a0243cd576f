//! Partial updates to user-editable task fields.
//!
//! AI suggestion fields are absent: only the enrichment path
//! may write them.

use super::{DurationHours, TaskDescription, TaskPriority, TaskStatus, TaskTitle};
use chrono::{DateTime, Utc};

/// Change to a nullable field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    /// Leave the stored value as is.
    #[default]
    Unchanged,
    /// Replace the stored value.
    Set(T),
    /// Clear the stored value.
    Clear,
}

impl<T> FieldUpdate<T> {
    /// Builds an update from a "present, possibly null" value.
    ///
    /// `None` means absent, `Some(None)` means clear.
    #[must_use]
    pub fn from_nullable(value: Option<Option<T>>) -> Self {
        match value {
            None => Self::Unchanged,
            Some(None) => Self::Clear,
            Some(Some(inner)) => Self::Set(inner),
        }
    }

    /// Returns whether the update leaves the field alone.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// Writes the update into `slot`.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Self::Unchanged => {}
            Self::Set(value) => *slot = Some(value),
            Self::Clear => *slot = None,
        }
    }

    /// Maps the contained value, keeping `Unchanged` and `Clear`.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `f`.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<FieldUpdate<U>, E> {
        Ok(match self {
            Self::Unchanged => FieldUpdate::Unchanged,
            Self::Set(value) => FieldUpdate::Set(f(value)?),
            Self::Clear => FieldUpdate::Clear,
        })
    }
}

/// Validated partial update of a task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskUpdate {
    /// New title, if changing.
    pub title: Option<TaskTitle>,
    /// Description change.
    pub description: FieldUpdate<TaskDescription>,
    /// New status, if changing.
    pub status: Option<TaskStatus>,
    /// User priority change.
    pub priority: FieldUpdate<TaskPriority>,
    /// Deadline change.
    pub deadline: FieldUpdate<DateTime<Utc>>,
    /// User estimate change.
    pub estimated_duration: FieldUpdate<DurationHours>,
}

impl TaskUpdate {
    /// Creates an update that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: TaskTitle) -> Self {
        self.title = Some(title);
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: FieldUpdate<TaskDescription>) -> Self {
        self.description = description;
        self
    }

    /// Sets or clears the user priority.
    #[must_use]
    pub fn with_priority(mut self, priority: FieldUpdate<TaskPriority>) -> Self {
        self.priority = priority;
        self
    }

    /// Sets or clears the deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: FieldUpdate<DateTime<Utc>>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Sets or clears the user estimate.
    #[must_use]
    pub fn with_estimated_duration(mut self, duration: FieldUpdate<DurationHours>) -> Self {
        self.estimated_duration = duration;
        self
    }

    /// Returns whether applying the update would change no field.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_unchanged()
            && self.status.is_none()
            && self.priority.is_unchanged()
            && self.deadline.is_unchanged()
            && self.estimated_duration.is_unchanged()
    }
}
