//! Domain model for owner-scoped tasks.
//!
//! The task domain models the task aggregate, its validated fields, partial
//! updates, and paginated queries while keeping all infrastructure concerns
//! outside of the domain boundary.

mod error;
mod fields;
mod ids;
mod query;
mod task;
mod update;

pub use error::{ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError};
pub use fields::{DurationHours, TaskDescription, TaskTitle};
pub use ids::TaskId;
pub use query::{PagePolicy, PageRequest, TaskFilter, TaskPage, TaskQuery};
pub use task::{PersistedTaskData, Task, TaskDraft, TaskPriority, TaskStatus};
pub use update::{FieldUpdate, TaskUpdate};
