//! Request and response bodies.

use crate::agent::domain::ActionKind;
use crate::agent::services::AgentReply;
use crate::identity::domain::{Identity, IdentityId};
use crate::identity::services::TokenPair;
use crate::task::domain::{FieldUpdate, Task, TaskId, TaskPage, TaskPriority, TaskStatus};
use crate::task::services::{CreateTaskRequest, ListTasksRequest, UpdateTaskRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Registration body.
#[derive(Deserialize)]
pub struct RegisterBody {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Optional display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Login body.
#[derive(Deserialize)]
pub struct LoginBody {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Refresh body.
#[derive(Deserialize)]
pub struct RefreshBody {
    /// A refresh token from a previous login, registration, or refresh.
    pub refresh_token: String,
}

/// Public view of an identity. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResponse {
    /// Identity identifier.
    pub id: IdentityId,
    /// Normalised email.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<&Identity> for IdentityResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id(),
            email: identity.email().as_str().to_owned(),
            display_name: identity.display_name().as_str().to_owned(),
            is_active: identity.is_active(),
            created_at: identity.created_at(),
            updated_at: identity.updated_at(),
        }
    }
}

/// Registration result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// The new identity.
    pub user: IdentityResponse,
    /// Tokens for the new identity.
    pub tokens: TokenPair,
}

/// Logout acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Always `true`.
    pub logged_out: bool,
}

/// Task creation body. AI fields are not accepted.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskBody {
    /// Title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional user priority.
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    /// Optional deadline.
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// Optional user estimate, in hours.
    #[serde(default)]
    pub estimated_duration: Option<u64>,
}

impl From<CreateTaskBody> for CreateTaskRequest {
    fn from(body: CreateTaskBody) -> Self {
        let mut request = Self::new(body.title);
        if let Some(description) = body.description {
            request = request.with_description(description);
        }
        if let Some(priority) = body.priority {
            request = request.with_priority(priority);
        }
        if let Some(deadline) = body.deadline {
            request = request.with_deadline(deadline);
        }
        if let Some(hours) = body.estimated_duration {
            request = request.with_estimated_duration(hours);
        }
        request
    }
}

/// Partial task update.
///
/// Absent fields are left unchanged; `null` clears the nullable ones.
/// Unknown fields, including the AI suggestion fields, are rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskBody {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// Description change.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    /// New status.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// User priority change.
    #[serde(default, deserialize_with = "present")]
    pub priority: Option<Option<TaskPriority>>,
    /// Deadline change.
    #[serde(default, deserialize_with = "present")]
    pub deadline: Option<Option<DateTime<Utc>>>,
    /// User estimate change, in hours.
    #[serde(default, deserialize_with = "present")]
    pub estimated_duration: Option<Option<u64>>,
}

/// Marks a field as present so that `null` can be told apart from absence.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<UpdateTaskBody> for UpdateTaskRequest {
    fn from(body: UpdateTaskBody) -> Self {
        Self {
            title: body.title,
            description: FieldUpdate::from_nullable(body.description),
            status: body.status,
            priority: FieldUpdate::from_nullable(body.priority),
            deadline: FieldUpdate::from_nullable(body.deadline),
            estimated_duration: FieldUpdate::from_nullable(body.estimated_duration),
        }
    }
}

/// Query string of the list endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TaskListQuery {
    /// Status filter.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// User priority filter.
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    /// Tasks to skip.
    #[serde(default)]
    pub skip: Option<u64>,
    /// Page size.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl From<TaskListQuery> for ListTasksRequest {
    fn from(query: TaskListQuery) -> Self {
        Self {
            status: query.status,
            priority: query.priority,
            offset: query.skip.unwrap_or(0),
            limit: query.limit,
        }
    }
}

/// Public view of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Task identifier.
    pub id: TaskId,
    /// Owning identity.
    pub owner_id: IdentityId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Status.
    pub status: TaskStatus,
    /// User priority.
    pub priority: Option<TaskPriority>,
    /// Deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// User estimate in hours.
    pub estimated_duration: Option<u16>,
    /// AI-suggested priority.
    pub ai_priority: Option<TaskPriority>,
    /// AI-suggested duration in hours.
    pub ai_estimated_duration: Option<u16>,
    /// When the task entered `completed`.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Deadline passed without completion.
    pub is_overdue: bool,
}

impl TaskResponse {
    /// Renders a task as seen at `now`.
    #[must_use]
    pub fn from_task(task: &Task, now: DateTime<Utc>) -> Self {
        Self {
            id: task.id(),
            owner_id: task.owner_id(),
            title: task.title().as_str().to_owned(),
            description: task.description().map(|d| d.as_str().to_owned()),
            status: task.status(),
            priority: task.priority(),
            deadline: task.deadline(),
            estimated_duration: task.estimated_duration().map(|d| d.value()),
            ai_priority: task.ai_priority(),
            ai_estimated_duration: task.ai_estimated_duration().map(|d| d.value()),
            completed_at: task.completed_at(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
            is_overdue: task.is_overdue(now),
        }
    }
}

/// One page of the task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListResponse {
    /// Tasks in this page, newest first.
    pub items: Vec<TaskResponse>,
    /// Matching tasks across all pages.
    pub total: u64,
    /// Tasks skipped.
    pub skip: u64,
    /// Effective page size after clamping.
    pub limit: u32,
}

impl TaskListResponse {
    /// Renders a page as seen at `now`.
    #[must_use]
    pub fn from_page(page: &TaskPage, now: DateTime<Utc>) -> Self {
        Self {
            items: page
                .tasks
                .iter()
                .map(|task| TaskResponse::from_task(task, now))
                .collect(),
            total: page.total,
            skip: page.page.offset(),
            limit: page.page.limit(),
        }
    }
}

/// Deletion acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedResponse {
    /// Always `true`.
    pub deleted: bool,
    /// The deleted task.
    pub id: TaskId,
}

/// Health check body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `healthy`.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Task agent chat body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentChatBody {
    /// What the user wants done, in plain language.
    pub message: String,
}

/// Task agent answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentChatResponse {
    /// Text for the user.
    pub message: String,
    /// Whether the action was carried out.
    pub success: bool,
    /// What was done.
    pub action: ActionKind,
    /// The task acted on, for single-task actions.
    pub task: Option<TaskResponse>,
    /// The listed tasks, for list actions.
    pub tasks: Vec<TaskResponse>,
}

impl AgentChatResponse {
    /// Renders a reply as seen at `now`.
    #[must_use]
    pub fn from_reply(reply: AgentReply, now: DateTime<Utc>) -> Self {
        Self {
            message: reply.message,
            success: reply.success,
            action: reply.action,
            task: reply.task.map(|task| TaskResponse::from_task(&task, now)),
            tasks: reply
                .tasks
                .iter()
                .map(|task| TaskResponse::from_task(task, now))
                .collect(),
        }
    }
}

/// One thing the task agent can do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCapability {
    /// Action kind.
    pub action: ActionKind,
    /// What it does.
    pub description: String,
    /// A message that triggers it.
    pub example: String,
}

/// What the task agent understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCapabilitiesResponse {
    /// Supported actions.
    pub capabilities: Vec<AgentCapability>,
    /// Accepted status values.
    pub statuses: Vec<TaskStatus>,
    /// Accepted priority values.
    pub priorities: Vec<TaskPriority>,
}
