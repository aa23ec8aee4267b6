//! Repositories for tenant and user records.
//!
//! Repositories operate on an already-open handle and never manage its
//! lifecycle; the connection manager and provisioning ops own that.

pub mod tenants;
pub mod users;

pub use tenants::TenantRepo;
pub use users::UserRepo;

use thiserror::Error;

/// Database error from a repository operation.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{column} '{value}' already exists")]
    UniqueViolation { column: &'static str, value: String },

    #[error("{resource} row missing after insert")]
    MissingAfterInsert { resource: &'static str },
}

impl DbError {
    /// Maps a unique-constraint failure on an insert to `UniqueViolation`;
    /// anything else stays a plain database error.
    pub(crate) fn from_insert(err: sqlx::Error, column: &'static str, value: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => DbError::UniqueViolation {
                column,
                value: value.to_string(),
            },
            _ => DbError::Sqlx(err),
        }
    }
}
