//! Chat-driven task actions executed through the task service.

use crate::agent::domain::{
    ActionKind, AgentAction, AgentMessage, AgentMessageError, TaskChanges, TaskReference,
    agent_prompt, parse_action,
};
use crate::enrichment::ports::InferenceClient;
use crate::enrichment::services::RateLimiter;
use crate::identity::domain::IdentityId;
use crate::task::{
    domain::{FieldUpdate, Task, TaskPriority, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError},
    services::{
        CreateTaskRequest, ListTasksRequest, TaskService, TaskServiceError, TaskServiceResult,
        UpdateTaskRequest,
    },
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

const UNREADABLE_REPLY: &str =
    "Sorry, I could not work out what to do. Could you rephrase the request?";
const NO_MATCH: &str = "I could not find a matching task.";

/// Agent limits. The agent keeps its own rate-limit window, separate from
/// enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSettings {
    /// Hard limit on one inference call.
    pub timeout: Duration,
    /// Calls admitted per window.
    pub rate_limit_calls: usize,
    /// Sliding window length.
    pub rate_limit_window: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            rate_limit_calls: 10,
            rate_limit_window: Duration::from_secs(60),
        }
    }
}

/// Errors that prevent the agent from answering at all.
///
/// Problems with the requested action itself, such as an invalid title or
/// an unknown task, are reported in an unsuccessful [`AgentReply`] instead.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The chat message is invalid.
    #[error(transparent)]
    Message(#[from] AgentMessageError),
    /// The provider could not be asked or did not answer in time.
    #[error("agent unavailable: {0}")]
    Unavailable(String),
    /// Task storage failed.
    #[error(transparent)]
    Task(#[from] TaskServiceError),
}

/// The agent's answer to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    /// Text for the user.
    pub message: String,
    /// Whether the action was carried out.
    pub success: bool,
    /// What was done.
    pub action: ActionKind,
    /// The task acted on, for single-task actions.
    pub task: Option<Task>,
    /// The listed tasks, for list actions.
    pub tasks: Vec<Task>,
}

impl AgentReply {
    fn done(action: ActionKind, message: String, task: Task) -> Self {
        Self {
            message,
            success: true,
            action,
            task: Some(task),
            tasks: Vec::new(),
        }
    }

    fn declined(action: ActionKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
            action,
            task: None,
            tasks: Vec::new(),
        }
    }
}

enum Resolution {
    Found(Task),
    Missing,
    Ambiguous,
}

impl Resolution {
    fn decline(self, kind: ActionKind, target: &TaskReference) -> AgentReply {
        match (self, target) {
            (Self::Ambiguous, TaskReference::Title(title)) => AgentReply::declined(
                kind,
                format!("More than one task matches '{title}'. Which one did you mean?"),
            ),
            _ => AgentReply::declined(kind, NO_MATCH),
        }
    }
}

/// Turns chat messages into task actions for the message's author.
pub struct TaskAgent<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    client: Arc<dyn InferenceClient>,
    tasks: TaskService<R, C>,
    clock: Arc<C>,
    limiter: RateLimiter,
    timeout: Duration,
}

impl<R, C> TaskAgent<R, C>
where
    R: TaskRepository + ?Sized + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates an agent acting through `tasks`.
    #[must_use]
    pub fn new(
        client: Arc<dyn InferenceClient>,
        tasks: TaskService<R, C>,
        clock: Arc<C>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            client,
            tasks,
            clock,
            limiter: RateLimiter::new(settings.rate_limit_calls, settings.rate_limit_window),
            timeout: settings.timeout,
        }
    }

    /// Interprets `message` and performs the resulting action for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Message`] for a blank or overlong message,
    /// [`AgentError::Unavailable`] when the provider is rate limited,
    /// failing, or too slow, and [`AgentError::Task`] when storage fails.
    pub async fn chat(&self, owner: IdentityId, message: &str) -> Result<AgentReply, AgentError> {
        let validated = AgentMessage::new(message)?;
        let reply = self.ask(&validated).await?;
        let action = match parse_action(&reply) {
            Ok(action) => action,
            Err(err) => {
                warn!(owner_id = %owner, error = %err, "agent reply rejected");
                return Ok(AgentReply::declined(ActionKind::None, UNREADABLE_REPLY));
            }
        };
        debug!(owner_id = %owner, action = action.kind().as_str(), "agent action parsed");

        let kind = action.kind();
        match self.execute(owner, action).await {
            Ok(outcome) => Ok(outcome),
            Err(TaskServiceError::Domain(err)) => Ok(AgentReply::declined(kind, err.to_string())),
            Err(TaskServiceError::Repository(TaskRepositoryError::NotFound(_))) => {
                Ok(AgentReply::declined(kind, NO_MATCH))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn ask(&self, message: &AgentMessage) -> Result<String, AgentError> {
        if let Err(err) = self.limiter.try_acquire() {
            warn!(error = %err, "agent call rate limited");
            return Err(AgentError::Unavailable(err.to_string()));
        }

        let prompt = agent_prompt(message, self.clock.utc());
        match tokio::time::timeout(self.timeout, self.client.complete(&prompt)).await {
            Err(_) => {
                warn!(timeout = ?self.timeout, "agent call timed out");
                Err(AgentError::Unavailable(format!(
                    "no reply within {}ms",
                    self.timeout.as_millis()
                )))
            }
            Ok(Err(err)) => {
                error!(error = %err, "agent call failed");
                Err(AgentError::Unavailable(err.to_string()))
            }
            Ok(Ok(reply)) => Ok(reply),
        }
    }

    async fn execute(
        &self,
        owner: IdentityId,
        action: AgentAction,
    ) -> TaskServiceResult<AgentReply> {
        let kind = action.kind();
        match action {
            AgentAction::Create {
                title,
                description,
                priority,
                deadline,
            } => {
                let mut request = CreateTaskRequest::new(title);
                if let Some(text) = description {
                    request = request.with_description(text);
                }
                if let Some(level) = priority {
                    request = request.with_priority(level);
                }
                if let Some(due) = deadline {
                    request = request.with_deadline(due);
                }
                let task = self.tasks.create_task(owner, request).await?;
                info!(task_id = %task.id(), owner_id = %owner, "agent created task");
                let message = format!("Created task '{}'.", task.title().as_str());
                Ok(AgentReply::done(kind, message, task))
            }
            AgentAction::Update { target, changes } => {
                let task = match self.resolve(owner, &target).await? {
                    Resolution::Found(task) => task,
                    unresolved => return Ok(unresolved.decline(kind, &target)),
                };
                let updated = self
                    .tasks
                    .update_task(owner, task.id(), update_request(changes))
                    .await?;
                info!(task_id = %updated.id(), owner_id = %owner, "agent updated task");
                let message = format!("Updated task '{}'.", updated.title().as_str());
                Ok(AgentReply::done(kind, message, updated))
            }
            AgentAction::Delete { target } => {
                let task = match self.resolve(owner, &target).await? {
                    Resolution::Found(task) => task,
                    unresolved => return Ok(unresolved.decline(kind, &target)),
                };
                self.tasks.delete_task(owner, task.id()).await?;
                info!(task_id = %task.id(), owner_id = %owner, "agent deleted task");
                let message = format!("Deleted task '{}'.", task.title().as_str());
                Ok(AgentReply::done(kind, message, task))
            }
            AgentAction::Get { target } => {
                let task = match self.resolve(owner, &target).await? {
                    Resolution::Found(task) => task,
                    unresolved => return Ok(unresolved.decline(kind, &target)),
                };
                let message = describe(&task);
                Ok(AgentReply::done(kind, message, task))
            }
            AgentAction::List { status, priority } => {
                self.list(owner, status, priority).await
            }
            AgentAction::Clarify { question } => Ok(AgentReply {
                message: question,
                success: true,
                action: kind,
                task: None,
                tasks: Vec::new(),
            }),
        }
    }

    async fn list(
        &self,
        owner: IdentityId,
        status: Option<TaskStatus>,
        priority: Option<TaskPriority>,
    ) -> TaskServiceResult<AgentReply> {
        let page = self
            .tasks
            .list_tasks(
                owner,
                ListTasksRequest {
                    status,
                    priority,
                    ..ListTasksRequest::default()
                },
            )
            .await?;
        let message = match page.total {
            0 => "You have no matching tasks.".to_owned(),
            1 => "You have 1 matching task.".to_owned(),
            total => format!("You have {total} matching tasks."),
        };
        Ok(AgentReply {
            message,
            success: true,
            action: ActionKind::List,
            task: None,
            tasks: page.tasks,
        })
    }

    async fn resolve(
        &self,
        owner: IdentityId,
        target: &TaskReference,
    ) -> TaskServiceResult<Resolution> {
        match target {
            TaskReference::Id(id) => match self.tasks.get_task(owner, *id).await {
                Ok(task) => Ok(Resolution::Found(task)),
                Err(TaskServiceError::Repository(TaskRepositoryError::NotFound(_))) => {
                    Ok(Resolution::Missing)
                }
                Err(err) => Err(err),
            },
            TaskReference::Title(title) => self.find_by_title(owner, title).await,
        }
    }

    /// An exact case-insensitive title match wins. Otherwise a single task
    /// whose title contains `title` is used.
    async fn find_by_title(&self, owner: IdentityId, title: &str) -> TaskServiceResult<Resolution> {
        let needle = title.to_lowercase();
        let limit = self.tasks.page_policy().max_limit();
        let mut offset = 0_u64;
        let mut partial = Vec::new();

        loop {
            let page = self
                .tasks
                .list_tasks(
                    owner,
                    ListTasksRequest {
                        offset,
                        limit: Some(limit),
                        ..ListTasksRequest::default()
                    },
                )
                .await?;
            let fetched = page.tasks.len();
            for task in page.tasks {
                let candidate = task.title().as_str().to_lowercase();
                if candidate == needle {
                    return Ok(Resolution::Found(task));
                }
                if candidate.contains(&needle) {
                    partial.push(task);
                }
            }
            offset = offset.saturating_add(u64::from(limit));
            if fetched == 0 || offset >= page.total {
                break;
            }
        }

        let mut candidates = partial.into_iter();
        Ok(match (candidates.next(), candidates.next()) {
            (Some(task), None) => Resolution::Found(task),
            (None, _) => Resolution::Missing,
            (Some(_), Some(_)) => Resolution::Ambiguous,
        })
    }
}

fn update_request(changes: TaskChanges) -> UpdateTaskRequest {
    let mut request = UpdateTaskRequest::new();
    if let Some(title) = changes.title {
        request = request.with_title(title);
    }
    if let Some(status) = changes.status {
        request = request.with_status(status);
    }
    if let Some(priority) = changes.priority {
        request.priority = FieldUpdate::Set(priority);
    }
    if let Some(deadline) = changes.deadline {
        request.deadline = FieldUpdate::Set(deadline);
    }
    request
}

fn describe(task: &Task) -> String {
    let priority = task.priority().map_or("none", TaskPriority::as_str);
    format!(
        "'{}' is {} with priority {priority}.",
        task.title().as_str(),
        task.status().as_str()
    )
}
