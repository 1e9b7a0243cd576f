//! Validated chat message.

use thiserror::Error;

/// A non-blank chat message of bounded length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentMessage(String);

/// Reasons a chat message is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentMessageError {
    /// Nothing but whitespace.
    #[error("message must not be empty")]
    Empty,
    /// Longer than [`AgentMessage::MAX_CHARS`].
    #[error(
        "message must be at most {max} characters, got {0}",
        max = AgentMessage::MAX_CHARS
    )]
    TooLong(usize),
}

impl AgentMessage {
    /// Longest accepted message, in characters.
    pub const MAX_CHARS: usize = 2_000;

    /// Trims and validates a message.
    ///
    /// # Errors
    ///
    /// Returns [`AgentMessageError`] when the message is blank or too long.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AgentMessageError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AgentMessageError::Empty);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_CHARS {
            return Err(AgentMessageError::TooLong(length));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the message text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
