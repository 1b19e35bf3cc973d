//! Error type shared by the repository functions.

use thiserror::Error;

/// Storage-layer failures.
///
/// `NotFound` marks a missing workflow id or webhook token, kept separate
/// from I/O faults so callers can treat absence as a domain outcome rather
/// than an infrastructure problem.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found")]
    NotFound,

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
