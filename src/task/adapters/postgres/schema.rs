//! Diesel schema for task persistence.

diesel::table! {
    /// Owner-scoped task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning identity.
        owner_id -> Uuid,
        /// Task title.
        #[max_length = 500]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Task status.
        #[max_length = 20]
        status -> Varchar,
        /// Optional user priority.
        #[max_length = 20]
        priority -> Nullable<Varchar>,
        /// Optional deadline.
        deadline -> Nullable<Timestamptz>,
        /// Optional user estimate in hours.
        estimated_duration -> Nullable<Int4>,
        /// AI-suggested priority.
        #[max_length = 20]
        ai_priority -> Nullable<Varchar>,
        /// AI-suggested duration in hours.
        ai_estimated_duration -> Nullable<Int4>,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}
