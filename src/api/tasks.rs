//! Task endpoints. Every handler is scoped to the authenticated identity.

use super::envelope::ApiSuccess;
use super::error::ApiResult;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::routes::AppState;
use super::session::AuthenticatedIdentity;
use super::types::{
    CreateTaskBody, DeletedResponse, TaskListQuery, TaskListResponse, TaskResponse,
    UpdateTaskBody,
};
use crate::task::domain::TaskId;
use axum::extract::State;
use mockable::Clock;
use std::sync::Arc;

/// `POST /api/v1/tasks`
///
/// Returns as soon as the task is stored. AI fields start out `null`.
///
/// # Errors
///
/// `VALIDATION_ERROR` for invalid fields.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    AuthenticatedIdentity(owner): AuthenticatedIdentity,
    ApiJson(body): ApiJson<CreateTaskBody>,
) -> ApiResult<ApiSuccess<TaskResponse>> {
    let task = state.tasks.create_task(owner, body.into()).await?;
    Ok(ApiSuccess::created(TaskResponse::from_task(
        &task,
        state.clock.utc(),
    )))
}

/// `GET /api/v1/tasks`
///
/// # Errors
///
/// `VALIDATION_ERROR` for an unparseable query string.
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    AuthenticatedIdentity(owner): AuthenticatedIdentity,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> ApiResult<ApiSuccess<TaskListResponse>> {
    let page = state.tasks.list_tasks(owner, query.into()).await?;
    Ok(ApiSuccess::ok(TaskListResponse::from_page(
        &page,
        state.clock.utc(),
    )))
}

/// `GET /api/v1/tasks/:id`
///
/// # Errors
///
/// `NOT_FOUND` when the task is absent or owned by someone else.
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    AuthenticatedIdentity(owner): AuthenticatedIdentity,
    ApiPath(id): ApiPath<TaskId>,
) -> ApiResult<ApiSuccess<TaskResponse>> {
    let task = state.tasks.get_task(owner, id).await?;
    Ok(ApiSuccess::ok(TaskResponse::from_task(
        &task,
        state.clock.utc(),
    )))
}

/// `PATCH|PUT /api/v1/tasks/:id`
///
/// # Errors
///
/// `VALIDATION_ERROR` for invalid or unknown fields and `NOT_FOUND` when
/// the task is absent or owned by someone else.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    AuthenticatedIdentity(owner): AuthenticatedIdentity,
    ApiPath(id): ApiPath<TaskId>,
    ApiJson(body): ApiJson<UpdateTaskBody>,
) -> ApiResult<ApiSuccess<TaskResponse>> {
    let task = state.tasks.update_task(owner, id, body.into()).await?;
    Ok(ApiSuccess::ok(TaskResponse::from_task(
        &task,
        state.clock.utc(),
    )))
}

/// `DELETE /api/v1/tasks/:id`
///
/// # Errors
///
/// `NOT_FOUND` when the task is absent or owned by someone else.
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    AuthenticatedIdentity(owner): AuthenticatedIdentity,
    ApiPath(id): ApiPath<TaskId>,
) -> ApiResult<ApiSuccess<DeletedResponse>> {
    state.tasks.delete_task(owner, id).await?;
    Ok(ApiSuccess::ok(DeletedResponse { deleted: true, id }))
}
