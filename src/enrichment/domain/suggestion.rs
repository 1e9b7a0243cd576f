//! Parsing untrusted provider replies into suggestions.
//!
//! Accepted forms, tried in order:
//!
//! 1. A JSON object `{"priority": "high", "estimated_hours": 3}`, possibly
//!    fenced in Markdown or surrounded by prose. The span from the first `{`
//!    to the last `}` is parsed.
//! 2. A comma pair `high, 3`. Each side may carry a `label:` prefix.

use crate::task::domain::{DurationHours, TaskPriority};
use serde_json::Value;
use thiserror::Error;

/// Maximum number of reply characters quoted in an error.
const EXCERPT_LEN: usize = 80;

/// A validated priority and duration suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    priority: TaskPriority,
    duration: DurationHours,
}

impl Suggestion {
    /// Creates a suggestion.
    #[must_use]
    pub const fn new(priority: TaskPriority, duration: DurationHours) -> Self {
        Self { priority, duration }
    }

    /// Returns the suggested priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the suggested duration.
    #[must_use]
    pub const fn duration(&self) -> DurationHours {
        self.duration
    }
}

/// Reasons a provider reply could not be turned into a suggestion.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SuggestionParseError {
    /// The reply was empty or whitespace.
    #[error("empty reply")]
    Empty,
    /// The reply matched neither accepted form.
    #[error("unrecognised reply: {0}")]
    Unrecognised(String),
    /// The priority is not one of the known values.
    #[error("unknown priority: {0}")]
    InvalidPriority(String),
    /// The duration is missing, not an integer, or out of range.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
}

/// Parses a provider reply.
///
/// # Errors
///
/// Returns a [`SuggestionParseError`] describing why the reply was rejected.
pub fn parse_suggestion(reply: &str) -> Result<Suggestion, SuggestionParseError> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Err(SuggestionParseError::Empty);
    }

    if let Some(object) = json_object_span(trimmed) {
        if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(object) {
            return from_json_fields(&fields);
        }
    }

    from_comma_pair(trimmed)
}

/// Returns the span from the first `{` to the last `}`, if any.
pub(crate) fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    text.get(start..=end)
}

fn from_json_fields(
    fields: &serde_json::Map<String, Value>,
) -> Result<Suggestion, SuggestionParseError> {
    let priority = match fields.get("priority") {
        Some(Value::String(raw)) => parse_priority(raw)?,
        Some(other) => return Err(SuggestionParseError::InvalidPriority(other.to_string())),
        None => return Err(SuggestionParseError::InvalidPriority("missing".to_owned())),
    };

    let duration = match fields.get("estimated_hours") {
        Some(Value::Number(number)) => {
            let hours = number
                .as_u64()
                .ok_or_else(|| SuggestionParseError::InvalidDuration(number.to_string()))?;
            to_duration(hours, &number.to_string())?
        }
        Some(Value::String(raw)) => parse_hours(raw)?,
        Some(other) => return Err(SuggestionParseError::InvalidDuration(other.to_string())),
        None => return Err(SuggestionParseError::InvalidDuration("missing".to_owned())),
    };

    Ok(Suggestion::new(priority, duration))
}

fn from_comma_pair(text: &str) -> Result<Suggestion, SuggestionParseError> {
    let Some((left, right)) = text.split_once(',') else {
        return Err(SuggestionParseError::Unrecognised(excerpt(text)));
    };
    let priority = parse_priority(strip_label(left))?;
    let duration = parse_hours(strip_label(right))?;
    Ok(Suggestion::new(priority, duration))
}

fn strip_label(part: &str) -> &str {
    part.rsplit(':').next().unwrap_or(part).trim()
}

fn parse_priority(raw: &str) -> Result<TaskPriority, SuggestionParseError> {
    let cleaned = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    TaskPriority::try_from(cleaned)
        .map_err(|_| SuggestionParseError::InvalidPriority(excerpt(cleaned)))
}

fn parse_hours(raw: &str) -> Result<DurationHours, SuggestionParseError> {
    let cleaned = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '.')
        .trim();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(SuggestionParseError::InvalidDuration(excerpt(raw.trim())));
    }
    let hours = cleaned
        .parse::<u64>()
        .map_err(|_| SuggestionParseError::InvalidDuration(excerpt(cleaned)))?;
    to_duration(hours, cleaned)
}

fn to_duration(hours: u64, raw: &str) -> Result<DurationHours, SuggestionParseError> {
    DurationHours::new(hours).map_err(|_| SuggestionParseError::InvalidDuration(excerpt(raw)))
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_LEN).collect()
}
