//! In-memory identity repository keyed by identifier with an email index.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::{
    domain::{EmailAddress, Identity, IdentityId},
    ports::{IdentityRepository, IdentityRepositoryError, IdentityRepositoryResult},
};

/// Thread-safe in-memory identity repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityRepository {
    state: Arc<RwLock<InMemoryIdentityState>>,
}

#[derive(Debug, Default)]
struct InMemoryIdentityState {
    identities: HashMap<IdentityId, Identity>,
    email_index: HashMap<EmailAddress, IdentityId>,
}

impl InMemoryIdentityRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl ToString) -> IdentityRepositoryError {
    IdentityRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn store(&self, identity: &Identity) -> IdentityRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;

        if state.identities.contains_key(&identity.id()) {
            return Err(IdentityRepositoryError::DuplicateIdentity(identity.id()));
        }
        if state.email_index.contains_key(identity.email()) {
            return Err(IdentityRepositoryError::DuplicateEmail(
                identity.email().clone(),
            ));
        }

        state
            .email_index
            .insert(identity.email().clone(), identity.id());
        state.identities.insert(identity.id(), identity.clone());
        Ok(())
    }

    async fn update(&self, identity: &Identity) -> IdentityRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;

        let Some(existing) = state.identities.get(&identity.id()) else {
            return Err(IdentityRepositoryError::NotFound(identity.id()));
        };
        if existing.email() != identity.email() {
            if state.email_index.contains_key(identity.email()) {
                return Err(IdentityRepositoryError::DuplicateEmail(
                    identity.email().clone(),
                ));
            }
            let old_email = existing.email().clone();
            state.email_index.remove(&old_email);
            state
                .email_index
                .insert(identity.email().clone(), identity.id());
        }

        state.identities.insert(identity.id(), identity.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: IdentityId) -> IdentityRepositoryResult<Option<Identity>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.identities.get(&id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> IdentityRepositoryResult<Option<Identity>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .email_index
            .get(email)
            .and_then(|id| state.identities.get(id))
            .cloned())
    }
}
