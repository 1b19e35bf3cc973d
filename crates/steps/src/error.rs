//! Step-level error type.

use thiserror::Error;

/// Errors returned by a step handler's `execute` method.
///
/// Any of these fail the step, and therefore the run. Unknown step, filter,
/// and action type tags are *not* errors — they pass the context through
/// unchanged, because the tag space is expected to grow.
#[derive(Debug, Error, Clone)]
pub enum StepError {
    /// A required payload field for the dispatched sub-type is absent or of
    /// the wrong shape.
    #[error("missing or invalid configuration field '{field}'")]
    MissingConfiguration { field: &'static str },

    /// A destination kind for an external-system action is not supported.
    #[error("unsupported destination '{0}'")]
    UnsupportedDestination(String),

    /// A delegated external call failed or timed out.
    #[error("upstream failure: {0}")]
    Upstream(String),
}
