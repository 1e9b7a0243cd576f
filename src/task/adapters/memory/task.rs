//! In-memory task repository behind a single `RwLock`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::domain::IdentityId;
use crate::task::{
    domain::{DurationHours, Task, TaskId, TaskPage, TaskPriority, TaskQuery},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut tasks = self.state.write().map_err(poisoned)?;
        if tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_owned(
        &self,
        id: TaskId,
        owner: IdentityId,
    ) -> TaskRepositoryResult<Option<Task>> {
        let tasks = self.state.read().map_err(poisoned)?;
        Ok(tasks
            .get(&id)
            .filter(|task| task.owner_id() == owner)
            .cloned())
    }

    async fn list_owned(
        &self,
        owner: IdentityId,
        query: &TaskQuery,
    ) -> TaskRepositoryResult<TaskPage> {
        let tasks = self.state.read().map_err(poisoned)?;
        let mut matching: Vec<&Task> = tasks
            .values()
            .filter(|task| task.owner_id() == owner && query.filter.matches(task))
            .collect();
        matching.sort_by_key(|task| Reverse((task.created_at(), task.id())));

        let total = u64::try_from(matching.len()).map_err(TaskRepositoryError::persistence)?;
        let offset = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.page.limit()).unwrap_or(usize::MAX);
        let page = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(TaskPage {
            tasks: page,
            total,
            page: query.page,
        })
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let mut tasks = self.state.write().map_err(poisoned)?;
        let Some(stored) = tasks
            .get_mut(&task.id())
            .filter(|stored| stored.owner_id() == task.owner_id())
        else {
            return Err(TaskRepositoryError::NotFound(task.id()));
        };

        let mut merged = task.clone();
        merged.reconcile_with_stored(stored);
        *stored = merged.clone();
        Ok(merged)
    }

    async fn update_ai_suggestions(
        &self,
        id: TaskId,
        priority: TaskPriority,
        duration: DurationHours,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Option<Task>> {
        let mut tasks = self.state.write().map_err(poisoned)?;
        Ok(tasks.get_mut(&id).map(|stored| {
            stored.record_ai_suggestion(priority, duration, at);
            stored.clone()
        }))
    }

    async fn delete_owned(&self, id: TaskId, owner: IdentityId) -> TaskRepositoryResult<()> {
        let mut tasks = self.state.write().map_err(poisoned)?;
        if !tasks.get(&id).is_some_and(|task| task.owner_id() == owner) {
            return Err(TaskRepositoryError::NotFound(id));
        }
        tasks.remove(&id);
        Ok(())
    }
}
