//! Prompt text sent to the inference provider.

use super::EnrichmentSubject;

const SYSTEM_INSTRUCTIONS: &str = "You are a planning assistant. Given a task, estimate its \
priority and how many whole hours it will take. Priority must be one of: low, medium, high, \
urgent. Hours must be an integer between 1 and 999. Reply with a single JSON object and \
nothing else, for example: {\"priority\": \"medium\", \"estimated_hours\": 4}";

/// System instructions and user message for one chat completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferencePrompt {
    system: String,
    user: String,
}

impl InferencePrompt {
    /// Creates a prompt from raw parts.
    #[must_use]
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// Builds the priority and duration prompt for a task.
    #[must_use]
    pub fn for_subject(subject: &EnrichmentSubject) -> Self {
        let description = subject
            .description()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or("(none)");
        Self::new(
            SYSTEM_INSTRUCTIONS,
            format!("Title: {}\nDescription: {description}", subject.title()),
        )
    }

    /// Returns the system instructions.
    #[must_use]
    pub fn system(&self) -> &str {
        &self.system
    }

    /// Returns the user message.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }
}
