//! `PostgreSQL` repository implementation for identities.

use super::{
    models::{IdentityRecord, IdentityRow},
    schema::identities,
};
use crate::identity::{
    domain::{
        DisplayName, EmailAddress, Identity, IdentityId, PasswordHash, PersistedIdentityData,
    },
    ports::{IdentityRepository, IdentityRepositoryError, IdentityRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by identity adapters.
pub type IdentityPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed identity repository.
#[derive(Debug, Clone)]
pub struct PostgresIdentityRepository {
    pool: IdentityPgPool,
}

impl PostgresIdentityRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: IdentityPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> IdentityRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> IdentityRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(IdentityRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(IdentityRepositoryError::persistence)?
    }
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn store(&self, identity: &Identity) -> IdentityRepositoryResult<()> {
        let identity_id = identity.id();
        let email = identity.email().clone();
        let record = to_record(identity);

        self.run_blocking(move |connection| {
            diesel::insert_into(identities::table)
                .values(&record)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_email_unique_violation(info.as_ref()) =>
                    {
                        IdentityRepositoryError::DuplicateEmail(email.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        IdentityRepositoryError::DuplicateIdentity(identity_id)
                    }
                    _ => IdentityRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, identity: &Identity) -> IdentityRepositoryResult<()> {
        let identity_id = identity.id();
        let record = to_record(identity);

        self.run_blocking(move |connection| {
            let updated = diesel::update(identities::table.find(identity_id.into_inner()))
                .set(&record)
                .execute(connection)
                .map_err(IdentityRepositoryError::persistence)?;
            if updated == 0 {
                return Err(IdentityRepositoryError::NotFound(identity_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: IdentityId) -> IdentityRepositoryResult<Option<Identity>> {
        self.run_blocking(move |connection| {
            let row = identities::table
                .find(id.into_inner())
                .select(IdentityRow::as_select())
                .first::<IdentityRow>(connection)
                .optional()
                .map_err(IdentityRepositoryError::persistence)?;
            row.map(row_to_identity).transpose()
        })
        .await
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> IdentityRepositoryResult<Option<Identity>> {
        let lookup = email.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = identities::table
                .filter(identities::email.eq(lookup))
                .select(IdentityRow::as_select())
                .first::<IdentityRow>(connection)
                .optional()
                .map_err(IdentityRepositoryError::persistence)?;
            row.map(row_to_identity).transpose()
        })
        .await
    }
}

fn to_record(identity: &Identity) -> IdentityRecord {
    IdentityRecord {
        id: identity.id().into_inner(),
        email: identity.email().as_str().to_owned(),
        password_hash: identity.password_hash().as_str().to_owned(),
        display_name: identity.display_name().as_str().to_owned(),
        is_active: identity.is_active(),
        created_at: identity.created_at(),
        updated_at: identity.updated_at(),
    }
}

fn row_to_identity(row: IdentityRow) -> IdentityRepositoryResult<Identity> {
    let email = EmailAddress::new(&row.email).map_err(IdentityRepositoryError::persistence)?;
    let display_name =
        DisplayName::new(&row.display_name).map_err(IdentityRepositoryError::persistence)?;

    Ok(Identity::from_persisted(PersistedIdentityData {
        id: IdentityId::from_uuid(row.id),
        email,
        password_hash: PasswordHash::from_encoded(row.password_hash),
        display_name,
        active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn is_email_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_identities_email_unique")
}
