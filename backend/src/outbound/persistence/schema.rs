//! Diesel table definitions for the PostgreSQL schema.
//!
//! Migrations are managed outside this crate; keep these definitions in step
//! with the deployed schema (`diesel print-schema` regenerates them).

diesel::table! {
    /// Registered accounts.
    ///
    /// `email` carries a unique constraint; its violation is how duplicate
    /// registrations are detected.
    users (id) {
        /// `BIGSERIAL` primary key.
        id -> Int8,
        username -> Varchar,
        email -> Varchar,
        /// PHC-formatted Argon2id hash.
        password_hash -> Text,
        role -> Varchar,
        created_at -> Timestamptz,
    }
}
