//! Task agent endpoints.

use super::envelope::ApiSuccess;
use super::error::ApiResult;
use super::extract::ApiJson;
use super::routes::AppState;
use super::session::AuthenticatedIdentity;
use super::types::{
    AgentCapabilitiesResponse, AgentCapability, AgentChatBody, AgentChatResponse,
};
use crate::agent::domain::ActionKind;
use crate::task::domain::{TaskPriority, TaskStatus};
use axum::extract::State;
use mockable::Clock;
use std::sync::Arc;

/// `POST /api/v1/agent/chat`
///
/// Answers `200` whenever the agent replied, including when it declined
/// the action; `success` says whether anything was done.
///
/// # Errors
///
/// `VALIDATION_ERROR` for a blank or overlong message and `AI_UNAVAILABLE`
/// when the provider cannot be reached in time.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    AuthenticatedIdentity(owner): AuthenticatedIdentity,
    ApiJson(body): ApiJson<AgentChatBody>,
) -> ApiResult<ApiSuccess<AgentChatResponse>> {
    let reply = state.agent.chat(owner, &body.message).await?;
    Ok(ApiSuccess::ok(AgentChatResponse::from_reply(
        reply,
        state.clock.utc(),
    )))
}

/// `GET /api/v1/agent/capabilities`
pub async fn capabilities() -> ApiSuccess<AgentCapabilitiesResponse> {
    let capability = |action, description: &str, example: &str| AgentCapability {
        action,
        description: description.to_owned(),
        example: example.to_owned(),
    };
    ApiSuccess::ok(AgentCapabilitiesResponse {
        capabilities: vec![
            capability(
                ActionKind::Create,
                "Add a task with a title, description, priority, and deadline",
                "Create a task called 'Buy groceries' with high priority",
            ),
            capability(
                ActionKind::Update,
                "Change a task's title, status, priority, or deadline",
                "Mark my project task as completed",
            ),
            capability(
                ActionKind::Delete,
                "Remove a task",
                "Delete the groceries task",
            ),
            capability(
                ActionKind::Get,
                "Show one task",
                "Show me the project task",
            ),
            capability(
                ActionKind::List,
                "List tasks, optionally by status or priority",
                "What urgent tasks do I have?",
            ),
        ],
        statuses: vec![TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed],
        priorities: vec![
            TaskPriority::Low,
            TaskPriority::Medium,
            TaskPriority::High,
            TaskPriority::Urgent,
        ],
    })
}
