//! Shared world state for task tracking BDD scenarios.

use std::collections::HashMap;
use std::time::Duration;

use crate::test_helpers::TestApp;
use rstest::fixture;
use taskwright::identity::{
    domain::{Identity, IdentityId},
    services::{CredentialError, TokenPair},
};
use taskwright::task::{domain::Task, services::TaskServiceError};

/// Scenario world for task tracking behaviour tests.
#[derive(Default)]
pub struct TrackerWorld {
    pub app: Option<TestApp>,
    pub users: HashMap<String, IdentityId>,
    pub registration: Option<Result<Identity, CredentialError>>,
    pub login: Option<Result<TokenPair, CredentialError>>,
    pub creation: Option<Result<Task, TaskServiceError>>,
    pub creation_elapsed: Option<Duration>,
    pub subject_task: Option<Task>,
    pub deletion: Option<Result<(), TaskServiceError>>,
}

impl TrackerWorld {
    /// Returns the application built by a `Given a tracker ...` step.
    ///
    /// # Errors
    ///
    /// Returns an error when no tracker has been set up.
    pub fn app(&self) -> eyre::Result<&TestApp> {
        self.app
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no tracker in scenario world"))
    }

    /// Returns the identity registered under `email`.
    ///
    /// # Errors
    ///
    /// Returns an error when `email` was never registered.
    pub fn user(&self, email: &str) -> eyre::Result<IdentityId> {
        self.users
            .get(email)
            .copied()
            .ok_or_else(|| eyre::eyre!("no registered user {email} in scenario world"))
    }

    /// Returns the task the scenario is about.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been created.
    pub fn subject_task(&self) -> eyre::Result<&Task> {
        self.subject_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no task in scenario world"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TrackerWorld {
    TrackerWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
