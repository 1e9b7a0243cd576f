//! The task agent.

mod agent;

pub use agent::{AgentError, AgentReply, AgentSettings, TaskAgent};
