//! Diesel schema for the enrichment audit trail.

diesel::table! {
    /// One row per enrichment attempt.
    enrichment_audit (id) {
        /// Record identifier.
        id -> Uuid,
        /// When the attempt finished.
        recorded_at -> Timestamptz,
        /// Owner of the enriched task.
        identity_id -> Uuid,
        /// Enriched task. Not a foreign key: tasks may be deleted.
        task_id -> Uuid,
        /// `success`, `timeout`, or `error`.
        #[max_length = 20]
        outcome -> Varchar,
        /// Elapsed milliseconds.
        latency_ms -> Int8,
        /// Failure detail.
        detail -> Nullable<Text>,
    }
}
