//! Repository port for owner-scoped task persistence.

use crate::identity::domain::IdentityId;
use crate::task::domain::{DurationHours, Task, TaskId, TaskPage, TaskPriority, TaskQuery};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Every method except [`TaskRepository::update_ai_suggestions`] is scoped to
/// an owner: a task owned by another identity behaves exactly like a missing
/// one.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier and owner in a single lookup.
    ///
    /// Returns `None` when the task does not exist or belongs to another
    /// owner.
    async fn find_owned(&self, id: TaskId, owner: IdentityId)
    -> TaskRepositoryResult<Option<Task>>;

    /// Lists an owner's tasks matching the query, newest first with the task
    /// identifier as a tiebreaker.
    async fn list_owned(
        &self,
        owner: IdentityId,
        query: &TaskQuery,
    ) -> TaskRepositoryResult<TaskPage>;

    /// Persists user-editable fields of an existing task and returns the
    /// stored result.
    ///
    /// AI suggestion columns are never written by this call, and
    /// `updated_at` never moves backwards.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no task with the
    /// identifier belongs to `task.owner_id()`.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task>;

    /// Records an enrichment result on a task regardless of owner.
    ///
    /// Returns `None` when the task no longer exists.
    async fn update_ai_suggestions(
        &self,
        id: TaskId,
        priority: TaskPriority,
        duration: DurationHours,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Option<Task>>;

    /// Physically deletes an owner's task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// or belongs to another owner.
    async fn delete_owned(&self, id: TaskId, owner: IdentityId) -> TaskRepositoryResult<()>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found for the requesting owner.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
