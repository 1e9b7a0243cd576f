//! Inference client with a fixed, scripted behaviour.
//!
//! Used by integration tests and local demos to simulate provider replies,
//! failures, slow responses, and hangs without network access.

use crate::enrichment::{
    domain::InferencePrompt,
    ports::{InferenceClient, InferenceError},
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What the scripted client does on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Return this reply text.
    Text(String),
    /// Fail with this error.
    Fail(InferenceError),
    /// Never complete.
    Hang,
}

/// Inference client returning the same scripted outcome on every call.
#[derive(Debug)]
pub struct ScriptedInferenceClient {
    reply: ScriptedReply,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedInferenceClient {
    /// Creates a client with the given behaviour and no delay.
    #[must_use]
    pub const fn new(reply: ScriptedReply) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Creates a client that always returns `text`.
    #[must_use]
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(ScriptedReply::Text(text.into()))
    }

    /// Creates a client that always fails with `error`.
    #[must_use]
    pub const fn failing(error: InferenceError) -> Self {
        Self::new(ScriptedReply::Fail(error))
    }

    /// Creates a client that never answers.
    #[must_use]
    pub const fn hanging() -> Self {
        Self::new(ScriptedReply::Hang)
    }

    /// Waits `delay` before answering.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns how many calls have been made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceClient for ScriptedInferenceClient {
    async fn complete(&self, _prompt: &InferencePrompt) -> Result<String, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.reply {
            ScriptedReply::Text(text) => Ok(text.clone()),
            ScriptedReply::Fail(error) => Err(error.clone()),
            ScriptedReply::Hang => std::future::pending().await,
        }
    }
}
