//! In-memory task adapters for tests and single-process deployments.

mod task;

pub use task::InMemoryTaskRepository;
