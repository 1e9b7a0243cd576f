//! Diesel schema for identity persistence.

diesel::table! {
    /// Registered user identities.
    identities (id) {
        /// Identity identifier.
        id -> Uuid,
        /// Normalized, unique login email.
        #[max_length = 255]
        email -> Varchar,
        /// Encoded PBKDF2 password hash.
        #[max_length = 255]
        password_hash -> Varchar,
        /// Display name.
        #[max_length = 255]
        display_name -> Varchar,
        /// Whether the account may authenticate.
        is_active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}
