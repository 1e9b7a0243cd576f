//! Unit tests for the task agent.
