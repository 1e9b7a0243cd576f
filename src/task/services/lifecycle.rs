//! Task lifecycle orchestration and background enrichment.

use crate::enrichment::{domain::EnrichmentSubject, ports::Enricher};
use crate::identity::domain::IdentityId;
use crate::task::{
    domain::{
        DurationHours, FieldUpdate, PagePolicy, PageRequest, Task, TaskDescription,
        TaskDomainError, TaskDraft, TaskFilter, TaskId, TaskPage, TaskPriority, TaskQuery,
        TaskStatus, TaskTitle, TaskUpdate,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Request parameters for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    priority: Option<TaskPriority>,
    deadline: Option<DateTime<Utc>>,
    estimated_duration: Option<u64>,
}

impl CreateTaskRequest {
    /// Creates a request with only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: None,
            deadline: None,
            estimated_duration: None,
        }
    }

    /// Sets the description. Blank descriptions are stored as absent.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the user priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the user estimate in hours.
    #[must_use]
    pub const fn with_estimated_duration(mut self, hours: u64) -> Self {
        self.estimated_duration = Some(hours);
        self
    }

    fn into_draft(self) -> Result<TaskDraft, TaskDomainError> {
        let mut draft = TaskDraft::new(TaskTitle::new(self.title)?);
        draft.description = self
            .description
            .filter(|text| !text.trim().is_empty())
            .map(TaskDescription::new)
            .transpose()?;
        draft.priority = self.priority;
        draft.deadline = self.deadline;
        draft.estimated_duration = self.estimated_duration.map(DurationHours::new).transpose()?;
        Ok(draft)
    }
}

/// Unvalidated partial update of a task.
///
/// AI suggestion fields have no counterpart here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateTaskRequest {
    /// New title.
    pub title: Option<String>,
    /// Description change. Setting a blank description clears it.
    pub description: FieldUpdate<String>,
    /// New status.
    pub status: Option<TaskStatus>,
    /// User priority change.
    pub priority: FieldUpdate<TaskPriority>,
    /// Deadline change.
    pub deadline: FieldUpdate<DateTime<Utc>>,
    /// User estimate change, in hours.
    pub estimated_duration: FieldUpdate<u64>,
}

impl UpdateTaskRequest {
    /// Creates a request that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Validates the request into a domain update.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaskDomainError`] raised by a field validator.
    pub fn into_update(self) -> Result<TaskUpdate, TaskDomainError> {
        let description = match self.description {
            FieldUpdate::Set(text) if text.trim().is_empty() => FieldUpdate::Clear,
            other => other.try_map(TaskDescription::new)?,
        };

        Ok(TaskUpdate {
            title: self.title.map(TaskTitle::new).transpose()?,
            description,
            status: self.status,
            priority: self.priority,
            deadline: self.deadline,
            estimated_duration: self.estimated_duration.try_map(DurationHours::new)?,
        })
    }
}

/// Filter and page parameters for listing tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListTasksRequest {
    /// Only tasks with this status.
    pub status: Option<TaskStatus>,
    /// Only tasks with this user priority.
    pub priority: Option<TaskPriority>,
    /// Number of matching tasks to skip.
    pub offset: u64,
    /// Requested page size, clamped by the service's [`PagePolicy`].
    pub limit: Option<u32>,
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed, including owner-scoped misses.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task lifecycle service.
///
/// Creation returns as soon as the task is stored; enrichment runs on a
/// tracked background job and patches the stored record when it resolves.
pub struct TaskService<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    enricher: Arc<dyn Enricher>,
    clock: Arc<C>,
    page_policy: PagePolicy,
    jobs: TaskTracker,
    accepting: Arc<AtomicBool>,
}

impl<R, C> Clone for TaskService<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            enricher: Arc::clone(&self.enricher),
            clock: Arc::clone(&self.clock),
            page_policy: self.page_policy,
            jobs: self.jobs.clone(),
            accepting: Arc::clone(&self.accepting),
        }
    }
}

impl<R, C> TaskService<R, C>
where
    R: TaskRepository + ?Sized + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new task service with the default page policy.
    #[must_use]
    pub fn new(repository: Arc<R>, enricher: Arc<dyn Enricher>, clock: Arc<C>) -> Self {
        Self {
            repository,
            enricher,
            clock,
            page_policy: PagePolicy::default(),
            jobs: TaskTracker::new(),
            accepting: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Replaces the page size bounds.
    #[must_use]
    pub const fn with_page_policy(mut self, page_policy: PagePolicy) -> Self {
        self.page_policy = page_policy;
        self
    }

    /// Returns the page size bounds.
    #[must_use]
    pub const fn page_policy(&self) -> PagePolicy {
        self.page_policy
    }

    /// Creates a task and schedules its enrichment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] when a field is invalid, in which
    /// case nothing is stored, or [`TaskServiceError::Repository`] when
    /// persistence fails.
    pub async fn create_task(
        &self,
        owner: IdentityId,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let draft = request.into_draft()?;
        let task = Task::new(owner, draft, &*self.clock);
        self.repository.store(&task).await?;
        info!(task_id = %task.id(), owner_id = %owner, "task created");

        self.schedule_enrichment(&task);
        Ok(task)
    }

    /// Returns one of the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task is absent or
    /// belongs to another owner.
    pub async fn get_task(&self, owner: IdentityId, id: TaskId) -> TaskServiceResult<Task> {
        self.repository
            .find_owned(id, owner)
            .await?
            .ok_or_else(|| TaskRepositoryError::NotFound(id).into())
    }

    /// Lists the owner's tasks, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::OffsetTooLarge`] when the offset exceeds
    /// [`PageRequest::MAX_OFFSET`] and [`TaskServiceError::Repository`] when
    /// the query fails.
    pub async fn list_tasks(
        &self,
        owner: IdentityId,
        request: ListTasksRequest,
    ) -> TaskServiceResult<TaskPage> {
        if request.offset > PageRequest::MAX_OFFSET {
            return Err(TaskDomainError::OffsetTooLarge(request.offset).into());
        }
        let query = TaskQuery {
            filter: TaskFilter {
                status: request.status,
                priority: request.priority,
            },
            page: PageRequest::new(request.offset, request.limit, &self.page_policy),
        };
        Ok(self.repository.list_owned(owner, &query).await?)
    }

    /// Applies a partial update to one of the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] when a field is invalid or
    /// [`TaskRepositoryError::NotFound`] when the task is absent or belongs
    /// to another owner.
    pub async fn update_task(
        &self,
        owner: IdentityId,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let update = request.into_update()?;
        let mut task = self.get_task(owner, id).await?;
        let previous_status = task.status();
        task.apply_update(update, &*self.clock);

        let stored = self.repository.update(&task).await?;
        if stored.status() == previous_status {
            debug!(task_id = %id, "task updated");
        } else {
            info!(
                task_id = %id,
                from = previous_status.as_str(),
                to = stored.status().as_str(),
                "task status changed"
            );
        }
        Ok(stored)
    }

    /// Deletes one of the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task is absent or
    /// belongs to another owner.
    pub async fn delete_task(&self, owner: IdentityId, id: TaskId) -> TaskServiceResult<()> {
        self.repository.delete_owned(id, owner).await?;
        info!(task_id = %id, owner_id = %owner, "task deleted");
        Ok(())
    }

    /// Waits up to `grace` for in-flight enrichment jobs and their audit
    /// writes.
    ///
    /// Returns `true` when every job finished in time. New jobs may still be
    /// scheduled afterwards.
    pub async fn wait_for_enrichment(&self, grace: Duration) -> bool {
        let deadline = Instant::now() + grace;
        self.jobs.close();
        let jobs_done = tokio::time::timeout_at(deadline, self.jobs.wait())
            .await
            .is_ok();
        if self.accepting.load(Ordering::Acquire) {
            self.jobs.reopen();
        }
        let audits_done = self
            .enricher
            .drain(deadline.saturating_duration_since(Instant::now()))
            .await;
        jobs_done && audits_done
    }

    /// Stops scheduling enrichment and waits up to `grace` for in-flight
    /// jobs. Jobs still running afterwards are abandoned.
    ///
    /// Returns `true` when every job finished in time.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.accepting.store(false, Ordering::Release);
        let deadline = Instant::now() + grace;
        self.jobs.close();
        let jobs_done = tokio::time::timeout_at(deadline, self.jobs.wait())
            .await
            .is_ok();
        let audits_done = self
            .enricher
            .drain(deadline.saturating_duration_since(Instant::now()))
            .await;
        let drained = jobs_done && audits_done;
        if drained {
            info!("enrichment jobs drained");
        } else {
            warn!(abandoned = self.jobs.len(), "abandoning in-flight enrichment jobs");
        }
        drained
    }

    fn schedule_enrichment(&self, task: &Task) {
        if !self.accepting.load(Ordering::Acquire) {
            debug!(task_id = %task.id(), "enrichment skipped: shutting down");
            return;
        }

        let subject = EnrichmentSubject::for_task(task);
        let enricher = Arc::clone(&self.enricher);
        let repository = Arc::clone(&self.repository);
        let clock = Arc::clone(&self.clock);

        self.jobs.spawn(async move {
            let task_id = subject.task_id();
            let Some(suggestion) = enricher.suggest(&subject).await else {
                return;
            };
            match repository
                .update_ai_suggestions(
                    task_id,
                    suggestion.priority(),
                    suggestion.duration(),
                    clock.utc(),
                )
                .await
            {
                Ok(Some(_)) => debug!(task_id = %task_id, "ai suggestions stored"),
                Ok(None) => debug!(task_id = %task_id, "task deleted before enrichment resolved"),
                Err(err) => {
                    warn!(task_id = %task_id, error = %err, "storing ai suggestions failed");
                }
            }
        });
    }
}
