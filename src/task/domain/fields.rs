//! Validated scalar fields of the task aggregate.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trimmed, printable task title of 1 to 500 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 500;

    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the trimmed value is
    /// empty, [`TaskDomainError::TitleTooLong`] when it exceeds
    /// [`Self::MAX_LENGTH`], or [`TaskDomainError::UnprintableTitle`] when it
    /// contains control characters.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(TaskDomainError::TitleTooLong(length));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(TaskDomainError::UnprintableTitle);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-text task description of up to 5000 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDescription(String);

impl TaskDescription {
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 5_000;

    /// Creates a validated description.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DescriptionTooLong`] when the value exceeds
    /// [`Self::MAX_LENGTH`].
    pub fn new(raw: impl Into<String>) -> Result<Self, TaskDomainError> {
        let value = raw.into();
        let length = value.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(TaskDomainError::DescriptionTooLong(length));
        }
        Ok(Self(value))
    }

    /// Returns the description text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whole-hour duration estimate between 1 and 999.
///
/// Shared by the user-entered estimate and the AI suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u16")]
pub struct DurationHours(u16);

impl DurationHours {
    /// Smallest accepted estimate.
    pub const MIN: u16 = 1;
    /// Largest accepted estimate.
    pub const MAX: u16 = 999;

    /// Creates a validated duration.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidDuration`] when the value is outside
    /// `MIN..=MAX`.
    pub fn new(hours: u64) -> Result<Self, TaskDomainError> {
        u16::try_from(hours)
            .ok()
            .filter(|value| (Self::MIN..=Self::MAX).contains(value))
            .map(Self)
            .ok_or(TaskDomainError::InvalidDuration(hours))
    }

    /// Returns the number of hours.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl TryFrom<u64> for DurationHours {
    type Error = TaskDomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DurationHours> for u16 {
    fn from(value: DurationHours) -> Self {
        value.0
    }
}

impl fmt::Display for DurationHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
