//! Parsing provider replies into typed agent actions.
//!
//! The provider is asked for one JSON object tagged by `"action"`. The span
//! from the first `{` to the last `}` is parsed, so Markdown fences and
//! surrounding prose are tolerated. A reply with no JSON object at all is
//! taken as a question back to the user.

use crate::enrichment::domain::json_object_span;
use crate::task::domain::{TaskId, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest clarification relayed from the provider, in characters.
const MAX_CLARIFICATION_CHARS: usize = 500;

/// Maximum number of reply characters quoted in an error.
const EXCERPT_LEN: usize = 80;

/// The task an action refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskReference {
    /// An exact identifier.
    Id(TaskId),
    /// A title, matched case-insensitively.
    Title(String),
}

/// Fields an update action changes. `None` leaves a field as is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskChanges {
    /// New title.
    pub title: Option<String>,
    /// New status.
    pub status: Option<TaskStatus>,
    /// New user priority.
    pub priority: Option<TaskPriority>,
    /// New deadline.
    pub deadline: Option<DateTime<Utc>>,
}

impl TaskChanges {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
    }
}

/// An action the agent performs for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentAction {
    /// Create a task.
    Create {
        /// Title.
        title: String,
        /// Optional description.
        description: Option<String>,
        /// Optional user priority.
        priority: Option<TaskPriority>,
        /// Optional deadline.
        deadline: Option<DateTime<Utc>>,
    },
    /// Change one task.
    Update {
        /// Task to change.
        target: TaskReference,
        /// Fields to change.
        changes: TaskChanges,
    },
    /// Delete one task.
    Delete {
        /// Task to delete.
        target: TaskReference,
    },
    /// Show one task.
    Get {
        /// Task to show.
        target: TaskReference,
    },
    /// List tasks.
    List {
        /// Only tasks with this status.
        status: Option<TaskStatus>,
        /// Only tasks with this user priority.
        priority: Option<TaskPriority>,
    },
    /// Ask the user for more detail. Nothing is changed.
    Clarify {
        /// Question relayed to the user.
        question: String,
    },
}

impl AgentAction {
    /// Returns the kind reported to the caller.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Create { .. } => ActionKind::Create,
            Self::Update { .. } => ActionKind::Update,
            Self::Delete { .. } => ActionKind::Delete,
            Self::Get { .. } => ActionKind::Get,
            Self::List { .. } => ActionKind::List,
            Self::Clarify { .. } => ActionKind::None,
        }
    }
}

/// Kind of action performed, as reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// A task was created.
    Create,
    /// A task was changed.
    Update,
    /// A task was deleted.
    Delete,
    /// A task was shown.
    Get,
    /// Tasks were listed.
    List,
    /// Nothing was done.
    None,
}

impl ActionKind {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Get => "get",
            Self::List => "list",
            Self::None => "none",
        }
    }
}

/// Reasons a provider reply could not be turned into an action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionParseError {
    /// The reply was empty or whitespace.
    #[error("empty reply")]
    Empty,
    /// The JSON object is not a known action or has ill-typed fields.
    #[error("invalid action: {0}")]
    Invalid(String),
    /// A status or priority value is not recognised.
    #[error("unknown {field}: {value}")]
    UnknownValue {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: String,
    },
    /// The action needs a task but names none.
    #[error("{0} action names no task")]
    MissingTarget(&'static str),
    /// An update that changes nothing.
    #[error("update action changes nothing")]
    NothingToChange,
}

#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum RawAction {
    Create {
        title: String,
        description: Option<String>,
        priority: Option<String>,
        deadline: Option<DateTime<Utc>>,
    },
    Update {
        task_id: Option<TaskId>,
        task_title: Option<String>,
        title: Option<String>,
        status: Option<String>,
        priority: Option<String>,
        deadline: Option<DateTime<Utc>>,
    },
    Delete {
        task_id: Option<TaskId>,
        task_title: Option<String>,
    },
    Get {
        task_id: Option<TaskId>,
        task_title: Option<String>,
    },
    List {
        status: Option<String>,
        priority: Option<String>,
    },
    Clarify {
        question: String,
    },
}

/// Parses a provider reply.
///
/// # Errors
///
/// Returns an [`ActionParseError`] describing why the reply was rejected.
pub fn parse_action(reply: &str) -> Result<AgentAction, ActionParseError> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Err(ActionParseError::Empty);
    }

    let Some(object) = json_object_span(trimmed) else {
        return Ok(AgentAction::Clarify {
            question: clarification(trimmed),
        });
    };
    let raw: RawAction = serde_json::from_str(object)
        .map_err(|err| ActionParseError::Invalid(excerpt(&err.to_string())))?;
    raw.try_into()
}

impl TryFrom<RawAction> for AgentAction {
    type Error = ActionParseError;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        match raw {
            RawAction::Create {
                title,
                description,
                priority,
                deadline,
            } => Ok(Self::Create {
                title,
                description,
                priority: priority.as_deref().map(parse_priority).transpose()?,
                deadline,
            }),
            RawAction::Update {
                task_id,
                task_title,
                title,
                status,
                priority,
                deadline,
            } => {
                let changes = TaskChanges {
                    title,
                    status: status.as_deref().map(parse_status).transpose()?,
                    priority: priority.as_deref().map(parse_priority).transpose()?,
                    deadline,
                };
                if changes.is_empty() {
                    return Err(ActionParseError::NothingToChange);
                }
                Ok(Self::Update {
                    target: reference("update", task_id, task_title)?,
                    changes,
                })
            }
            RawAction::Delete {
                task_id,
                task_title,
            } => Ok(Self::Delete {
                target: reference("delete", task_id, task_title)?,
            }),
            RawAction::Get {
                task_id,
                task_title,
            } => Ok(Self::Get {
                target: reference("get", task_id, task_title)?,
            }),
            RawAction::List { status, priority } => Ok(Self::List {
                status: status.as_deref().map(parse_status).transpose()?,
                priority: priority.as_deref().map(parse_priority).transpose()?,
            }),
            RawAction::Clarify { question } => Ok(Self::Clarify {
                question: clarification(&question),
            }),
        }
    }
}

/// An identifier wins over a title when both are given.
fn reference(
    action: &'static str,
    task_id: Option<TaskId>,
    task_title: Option<String>,
) -> Result<TaskReference, ActionParseError> {
    if let Some(id) = task_id {
        return Ok(TaskReference::Id(id));
    }
    task_title
        .map(|title| title.trim().to_owned())
        .filter(|title| !title.is_empty())
        .map(TaskReference::Title)
        .ok_or(ActionParseError::MissingTarget(action))
}

fn parse_status(raw: &str) -> Result<TaskStatus, ActionParseError> {
    TaskStatus::try_from(raw.replace([' ', '-'], "_").as_str()).map_err(|_| {
        ActionParseError::UnknownValue {
            field: "status",
            value: excerpt(raw),
        }
    })
}

fn parse_priority(raw: &str) -> Result<TaskPriority, ActionParseError> {
    TaskPriority::try_from(raw).map_err(|_| ActionParseError::UnknownValue {
        field: "priority",
        value: excerpt(raw),
    })
}

fn clarification(text: &str) -> String {
    text.trim().chars().take(MAX_CLARIFICATION_CHARS).collect()
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_LEN).collect()
}
