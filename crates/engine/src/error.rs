//! Engine-level error types.

use std::time::Duration;

use thiserror::Error;

/// Errors produced outside a single step's execution: schedule registration
/// and storage access. Step-level failures are carried inside a
/// [`crate::RunReport`] instead, because a failed run is a recorded outcome,
/// not an error the caller must handle.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A literal schedule expression did not parse. Surfaces per workflow at
    /// registration time; other workflows keep registering.
    #[error("invalid schedule expression '{expression}': {source}")]
    InvalidSchedule {
        expression: String,
        #[source]
        source: cron::error::Error,
    },

    /// Repository or ledger I/O failure from the db crate.
    #[error("storage error: {0}")]
    Storage(#[from] db::DbError),

    /// A store or ledger call exceeded its time bound. A wedged connection
    /// must not hang a job's task.
    #[error("storage operation '{operation}' timed out after {timeout:?}")]
    StorageTimeout {
        operation: &'static str,
        timeout: Duration,
    },
}
