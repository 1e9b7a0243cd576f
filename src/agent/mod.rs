//! Natural-language task management.
//!
//! A chat message is sent to the inference provider together with a
//! description of the actions the agent can take. The reply is parsed into a
//! typed [`domain::AgentAction`] and executed through the
//! [`crate::task::services::TaskService`] on behalf of the caller, so every
//! action is owner-scoped exactly like the task endpoints. A reply that is
//! not a valid action never touches storage.
//!
//! - Domain types and the reply parser in [`domain`]
//! - The agent service in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
