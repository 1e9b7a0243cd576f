//! Agent messages, prompts, and the actions parsed from provider replies.

mod action;
mod message;
mod prompt;

pub use action::{
    ActionKind, ActionParseError, AgentAction, TaskChanges, TaskReference, parse_action,
};
pub use message::{AgentMessage, AgentMessageError};
pub use prompt::agent_prompt;
