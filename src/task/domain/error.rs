//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The title exceeds the maximum length.
    #[error(
        "task title is {0} characters long, the maximum is {max}",
        max = super::TaskTitle::MAX_LENGTH
    )]
    TitleTooLong(usize),

    /// The title contains control characters.
    #[error("task title must contain only printable characters")]
    UnprintableTitle,

    /// The description exceeds the maximum length.
    #[error(
        "task description is {0} characters long, the maximum is {max}",
        max = super::TaskDescription::MAX_LENGTH
    )]
    DescriptionTooLong(usize),

    /// The duration estimate is outside the accepted range.
    #[error(
        "estimated duration must be between {min} and {max} hours, got {0}",
        min = super::DurationHours::MIN,
        max = super::DurationHours::MAX
    )]
    InvalidDuration(u64),

    /// The page offset is beyond what storage can address.
    #[error("skip must be at most {max}, got {0}", max = super::PageRequest::MAX_OFFSET)]
    OffsetTooLarge(u64),
}

impl TaskDomainError {
    /// Returns the request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong(_) | Self::UnprintableTitle => "title",
            Self::DescriptionTooLong(_) => "description",
            Self::InvalidDuration(_) => "estimated_duration",
            Self::OffsetTooLarge(_) => "skip",
        }
    }
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);
