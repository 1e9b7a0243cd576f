//! Inference client used when no provider is configured.

use crate::enrichment::{
    domain::InferencePrompt,
    ports::{InferenceClient, InferenceError},
};
use async_trait::async_trait;

/// Fails every call immediately with [`InferenceError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledInferenceClient;

#[async_trait]
impl InferenceClient for DisabledInferenceClient {
    async fn complete(&self, _prompt: &InferencePrompt) -> Result<String, InferenceError> {
        Err(InferenceError::Unavailable(
            "no inference API key configured".to_owned(),
        ))
    }
}
