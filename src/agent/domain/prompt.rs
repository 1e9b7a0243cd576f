//! Prompt text for the task agent.

use super::AgentMessage;
use crate::enrichment::domain::InferencePrompt;
use chrono::{DateTime, SecondsFormat, Utc};

const SYSTEM_INSTRUCTIONS: &str = concat!(
    "You manage a user's task list. Turn the user's message into exactly one action and ",
    "reply with a single JSON object and nothing else.\n\n",
    "Actions:\n",
    r#"{"action": "create", "title": "...", "description": "...", "priority": "medium", "#,
    r#""deadline": "2026-01-31T17:00:00Z"}"#,
    "\n",
    r#"{"action": "update", "task_title": "...", "title": "...", "status": "completed", "#,
    r#""priority": "high", "deadline": "..."}"#,
    "\n",
    r#"{"action": "delete", "task_title": "..."}"#,
    "\n",
    r#"{"action": "get", "task_title": "..."}"#,
    "\n",
    r#"{"action": "list", "status": "pending", "priority": "urgent"}"#,
    "\n",
    r#"{"action": "clarify", "question": "..."}"#,
    "\n\nRules:\n",
    "- Only \"action\" is always required. Omit fields the user did not mention.\n",
    "- Use \"task_id\" instead of \"task_title\" when the user gives a task identifier.\n",
    "- Status is one of: pending, in_progress, completed. \"Done\" or \"finished\" means ",
    "completed; \"start\" means in_progress; \"reopen\" means pending.\n",
    "- Priority is one of: low, medium, high, urgent.\n",
    "- Deadlines are RFC 3339 timestamps in UTC. Resolve relative dates against the ",
    "current time given below.\n",
    "- When the request is ambiguous or lacks a title, use \"clarify\".",
);

/// Builds the agent prompt for one message sent at `now`.
#[must_use]
pub fn agent_prompt(message: &AgentMessage, now: DateTime<Utc>) -> InferencePrompt {
    InferencePrompt::new(
        SYSTEM_INSTRUCTIONS,
        format!(
            "Current time: {}\nMessage: {}",
            now.to_rfc3339_opts(SecondsFormat::Secs, true),
            message.as_str()
        ),
    )
}
