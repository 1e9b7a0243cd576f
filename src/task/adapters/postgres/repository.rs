//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, TaskRow},
    schema::tasks,
};
use crate::identity::domain::IdentityId;
use crate::task::{
    domain::{
        DurationHours, PersistedTaskData, Task, TaskDescription, TaskFilter, TaskId, TaskPage,
        TaskPriority, TaskQuery, TaskStatus, TaskTitle,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{Int4, Nullable, Text, Timestamptz, Uuid as SqlUuid};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

const TASK_COLUMNS: &str = "id, owner_id, title, description, status, priority, deadline, \
     estimated_duration, ai_priority, ai_estimated_duration, completed_at, created_at, updated_at";

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_owned(
        &self,
        id: TaskId,
        owner: IdentityId,
    ) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_owned(
        &self,
        owner: IdentityId,
        query: &TaskQuery,
    ) -> TaskRepositoryResult<TaskPage> {
        let TaskQuery { filter, page } = *query;
        let owner_id = owner.into_inner();
        let offset = i64::try_from(page.offset()).map_err(TaskRepositoryError::persistence)?;
        let limit = i64::from(page.limit());

        self.run_blocking(move |connection| {
            let total = filtered(owner_id, filter)
                .count()
                .get_result::<i64>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            let rows = filtered(owner_id, filter)
                .order((tasks::created_at.desc(), tasks::id.desc()))
                .offset(offset)
                .limit(limit)
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;

            Ok(TaskPage {
                tasks: rows
                    .into_iter()
                    .map(row_to_task)
                    .collect::<TaskRepositoryResult<_>>()?,
                total: u64::try_from(total).map_err(TaskRepositoryError::persistence)?,
                page,
            })
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let task_id = task.id();
        let changes = to_new_row(task);
        let completed_at = task.completed_at();

        self.run_blocking(move |connection| {
            let row = diesel::sql_query(format!(
                "UPDATE tasks SET title = $1, description = $2, status = $3, priority = $4, \
                 deadline = $5, estimated_duration = $6, completed_at = $7, \
                 updated_at = GREATEST(updated_at, $8) \
                 WHERE id = $9 AND owner_id = $10 RETURNING {TASK_COLUMNS}"
            ))
            .bind::<Text, _>(changes.title)
            .bind::<Nullable<Text>, _>(changes.description)
            .bind::<Text, _>(changes.status)
            .bind::<Nullable<Text>, _>(changes.priority)
            .bind::<Nullable<Timestamptz>, _>(changes.deadline)
            .bind::<Nullable<Int4>, _>(changes.estimated_duration)
            .bind::<Nullable<Timestamptz>, _>(completed_at)
            .bind::<Timestamptz, _>(changes.updated_at)
            .bind::<SqlUuid, _>(changes.id)
            .bind::<SqlUuid, _>(changes.owner_id)
            .get_result::<TaskRow>(connection)
            .optional()
            .map_err(TaskRepositoryError::persistence)?;

            row.map(row_to_task)
                .transpose()?
                .ok_or(TaskRepositoryError::NotFound(task_id))
        })
        .await
    }

    async fn update_ai_suggestions(
        &self,
        id: TaskId,
        priority: TaskPriority,
        duration: DurationHours,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = diesel::sql_query(format!(
                "UPDATE tasks SET ai_priority = $1, ai_estimated_duration = $2, \
                 updated_at = GREATEST(updated_at, $3) \
                 WHERE id = $4 RETURNING {TASK_COLUMNS}"
            ))
            .bind::<Text, _>(priority.as_str())
            .bind::<Int4, _>(i32::from(duration.value()))
            .bind::<Timestamptz, _>(at)
            .bind::<SqlUuid, _>(id.into_inner())
            .get_result::<TaskRow>(connection)
            .optional()
            .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn delete_owned(&self, id: TaskId, owner: IdentityId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                tasks::table
                    .filter(tasks::id.eq(id.into_inner()))
                    .filter(tasks::owner_id.eq(owner.into_inner())),
            )
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn filtered(owner: uuid::Uuid, filter: TaskFilter) -> tasks::BoxedQuery<'static, Pg> {
    let mut query = tasks::table
        .filter(tasks::owner_id.eq(owner))
        .into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(tasks::status.eq(status.as_str()));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(tasks::priority.eq(priority.as_str()));
    }
    query
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        owner_id: task.owner_id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().map(|d| d.as_str().to_owned()),
        status: task.status().as_str().to_owned(),
        priority: task.priority().map(|p| p.as_str().to_owned()),
        deadline: task.deadline(),
        estimated_duration: task.estimated_duration().map(|d| i32::from(d.value())),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        owner_id,
        title,
        description,
        status,
        priority,
        deadline,
        estimated_duration,
        ai_priority,
        ai_estimated_duration,
        completed_at,
        created_at,
        updated_at,
    } = row;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner_id: IdentityId::from_uuid(owner_id),
        title: TaskTitle::new(title).map_err(TaskRepositoryError::persistence)?,
        description: description
            .map(TaskDescription::new)
            .transpose()
            .map_err(TaskRepositoryError::persistence)?,
        status: TaskStatus::try_from(status.as_str()).map_err(TaskRepositoryError::persistence)?,
        priority: parse_priority(priority)?,
        deadline,
        estimated_duration: parse_duration(estimated_duration)?,
        ai_priority: parse_priority(ai_priority)?,
        ai_estimated_duration: parse_duration(ai_estimated_duration)?,
        completed_at,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}

fn parse_priority(value: Option<String>) -> TaskRepositoryResult<Option<TaskPriority>> {
    value
        .map(|raw| TaskPriority::try_from(raw.as_str()))
        .transpose()
        .map_err(TaskRepositoryError::persistence)
}

fn parse_duration(value: Option<i32>) -> TaskRepositoryResult<Option<DurationHours>> {
    value
        .map(|raw| {
            let hours = u64::try_from(raw).map_err(TaskRepositoryError::persistence)?;
            DurationHours::new(hours).map_err(TaskRepositoryError::persistence)
        })
        .transpose()
}
