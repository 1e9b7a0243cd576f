//! Orchestration services for the task lifecycle.

mod lifecycle;

pub use lifecycle::{
    CreateTaskRequest, ListTasksRequest, TaskService, TaskServiceError, TaskServiceResult,
    UpdateTaskRequest,
};
