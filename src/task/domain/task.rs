//! Task aggregate root and related status and priority types.

use super::{
    DurationHours, ParseTaskPriorityError, ParseTaskStatusError, TaskDescription, TaskId,
    TaskTitle, TaskUpdate,
};
use crate::identity::domain::IdentityId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task progress status.
///
/// Any status may be set from any other; only `completed_at` tracks the
/// transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not started.
    Pending,
    /// Work is underway.
    InProgress,
    /// Work is finished.
    Completed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Task priority, set by the user or suggested by enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Normal importance.
    Medium,
    /// Should be done soon.
    High,
    /// Needs immediate attention.
    Urgent,
}

impl TaskPriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseTaskPriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseTaskPriorityError(value.to_owned())),
        }
    }
}

/// Validated user input for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Task title.
    pub title: TaskTitle,
    /// Optional description.
    pub description: Option<TaskDescription>,
    /// Optional user-chosen priority.
    pub priority: Option<TaskPriority>,
    /// Optional deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Optional user estimate.
    pub estimated_duration: Option<DurationHours>,
}

impl TaskDraft {
    /// Creates a draft with only a title.
    #[must_use]
    pub const fn new(title: TaskTitle) -> Self {
        Self {
            title,
            description: None,
            priority: None,
            deadline: None,
            estimated_duration: None,
        }
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    owner_id: IdentityId,
    title: TaskTitle,
    description: Option<TaskDescription>,
    status: TaskStatus,
    priority: Option<TaskPriority>,
    deadline: Option<DateTime<Utc>>,
    estimated_duration: Option<DurationHours>,
    ai_priority: Option<TaskPriority>,
    ai_estimated_duration: Option<DurationHours>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning identity.
    pub owner_id: IdentityId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: Option<TaskDescription>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted user priority.
    pub priority: Option<TaskPriority>,
    /// Persisted deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Persisted user estimate.
    pub estimated_duration: Option<DurationHours>,
    /// Persisted AI priority suggestion.
    pub ai_priority: Option<TaskPriority>,
    /// Persisted AI duration suggestion.
    pub ai_estimated_duration: Option<DurationHours>,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task owned by `owner_id`.
    #[must_use]
    pub fn new(owner_id: IdentityId, draft: TaskDraft, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            owner_id,
            title: draft.title,
            description: draft.description,
            status: TaskStatus::Pending,
            priority: draft.priority,
            deadline: draft.deadline,
            estimated_duration: draft.estimated_duration,
            ai_priority: None,
            ai_estimated_duration: None,
            completed_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner_id: data.owner_id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            deadline: data.deadline,
            estimated_duration: data.estimated_duration,
            ai_priority: data.ai_priority,
            ai_estimated_duration: data.ai_estimated_duration,
            completed_at: data.completed_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning identity.
    #[must_use]
    pub const fn owner_id(&self) -> IdentityId {
        self.owner_id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub const fn description(&self) -> Option<&TaskDescription> {
        self.description.as_ref()
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the user-chosen priority, if any.
    #[must_use]
    pub const fn priority(&self) -> Option<TaskPriority> {
        self.priority
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Returns the user estimate, if any.
    #[must_use]
    pub const fn estimated_duration(&self) -> Option<DurationHours> {
        self.estimated_duration
    }

    /// Returns the AI-suggested priority, if enrichment has resolved.
    #[must_use]
    pub const fn ai_priority(&self) -> Option<TaskPriority> {
        self.ai_priority
    }

    /// Returns the AI-suggested duration, if enrichment has resolved.
    #[must_use]
    pub const fn ai_estimated_duration(&self) -> Option<DurationHours> {
        self.ai_estimated_duration
    }

    /// Returns when the task entered `completed`, if it is completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the deadline has passed without the task completing.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TaskStatus::Completed && self.deadline.is_some_and(|due| due < now)
    }

    /// Applies a partial update. Absent fields are left unchanged.
    ///
    /// `updated_at` is refreshed even when the update changes nothing.
    pub fn apply_update(&mut self, update: TaskUpdate, clock: &impl Clock) {
        let now = clock.utc();
        let TaskUpdate {
            title,
            description,
            status,
            priority,
            deadline,
            estimated_duration,
        } = update;

        if let Some(title) = title {
            self.title = title;
        }
        description.apply_to(&mut self.description);
        priority.apply_to(&mut self.priority);
        deadline.apply_to(&mut self.deadline);
        estimated_duration.apply_to(&mut self.estimated_duration);
        if let Some(status) = status {
            self.set_status(status, now);
        }
        self.touch_at(now);
    }

    fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        let was_completed = self.status == TaskStatus::Completed;
        let is_completed = status == TaskStatus::Completed;
        if is_completed && !was_completed {
            self.completed_at = Some(now);
        } else if !is_completed {
            self.completed_at = None;
        }
        self.status = status;
    }

    /// Stores an enrichment result.
    pub(crate) fn record_ai_suggestion(
        &mut self,
        priority: TaskPriority,
        duration: DurationHours,
        at: DateTime<Utc>,
    ) {
        self.ai_priority = Some(priority);
        self.ai_estimated_duration = Some(duration);
        self.touch_at(at);
    }

    /// Carries stored AI fields and the later of both timestamps onto a
    /// user-updated copy, so a user write never clobbers enrichment.
    pub(crate) fn reconcile_with_stored(&mut self, stored: &Self) {
        self.ai_priority = stored.ai_priority;
        self.ai_estimated_duration = stored.ai_estimated_duration;
        self.touch_at(stored.updated_at);
    }

    fn touch_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at.max(self.updated_at);
    }
}
