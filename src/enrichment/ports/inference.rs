//! Outbound port to a text-completion provider.

use crate::enrichment::domain::InferencePrompt;
use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by inference clients.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InferenceError {
    /// No provider is configured.
    #[error("inference unavailable: {0}")]
    Unavailable(String),
    /// The request did not complete.
    #[error("transport error: {0}")]
    Transport(String),
    /// The provider answered with a non-success status.
    #[error("provider returned status {status}: {body}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },
    /// The provider response did not have the expected shape.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// A single-shot completion call. Implementations must not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Sends the prompt and returns the raw reply text.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError`] when the provider is unavailable, the
    /// request fails, or the response cannot be read.
    async fn complete(&self, prompt: &InferencePrompt) -> Result<String, InferenceError>;
}
