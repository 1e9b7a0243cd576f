//! Filtered, paginated task queries.

use super::{Task, TaskPriority, TaskStatus};

/// Page size bounds applied to every list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePolicy {
    default_limit: u32,
    max_limit: u32,
}

impl Default for PagePolicy {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl PagePolicy {
    /// Creates a policy. Both bounds are raised to at least one and the
    /// default never exceeds the maximum.
    #[must_use]
    pub fn new(default_limit: u32, max_limit: u32) -> Self {
        let max = max_limit.max(1);
        Self {
            default_limit: default_limit.clamp(1, max),
            max_limit: max,
        }
    }

    /// Returns the limit used when the caller supplies none.
    #[must_use]
    pub const fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Returns the largest permitted limit.
    #[must_use]
    pub const fn max_limit(&self) -> u32 {
        self.max_limit
    }
}

/// Offset and limit of a page, already clamped to a [`PagePolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    offset: u64,
    limit: u32,
}

impl PageRequest {
    /// Largest offset any adapter accepts.
    pub const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

    /// Builds a page request, clamping `limit` to `[1, policy.max_limit]`.
    #[must_use]
    pub fn new(offset: u64, limit: Option<u32>, policy: &PagePolicy) -> Self {
        let clamped = limit
            .unwrap_or(policy.default_limit)
            .clamp(1, policy.max_limit);
        Self {
            offset,
            limit: clamped,
        }
    }

    /// Returns the number of matching tasks to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the maximum number of tasks in the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }
}

/// Conjunctive task filter. `None` matches every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskFilter {
    /// Required status.
    pub status: Option<TaskStatus>,
    /// Required user priority.
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    /// Returns whether the task passes the filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status() == status)
            && self
                .priority
                .is_none_or(|priority| task.priority() == Some(priority))
    }
}

/// A filter plus the requested page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskQuery {
    /// Filter applied before pagination.
    pub filter: TaskFilter,
    /// Requested page.
    pub page: PageRequest,
}

/// One page of tasks, newest first, and the filtered total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    /// Tasks in this page.
    pub tasks: Vec<Task>,
    /// Number of tasks matching the filter across all pages.
    pub total: u64,
    /// The page that was requested.
    pub page: PageRequest,
}
