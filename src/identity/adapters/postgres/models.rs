//! Diesel row models for identity persistence.

use super::schema::identities;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for identity records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = identities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IdentityRow {
    /// Identity identifier.
    pub id: uuid::Uuid,
    /// Normalized email.
    pub email: String,
    /// Encoded password hash.
    pub password_hash: String,
    /// Display name.
    pub display_name: String,
    /// Active flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for identity records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = identities)]
pub struct IdentityRecord {
    /// Identity identifier.
    pub id: uuid::Uuid,
    /// Normalized email.
    pub email: String,
    /// Encoded password hash.
    pub password_hash: String,
    /// Display name.
    pub display_name: String,
    /// Active flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}
