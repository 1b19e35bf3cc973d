//! The `StepHandler` trait — the contract every step type must fulfil.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{DataContext, StepError};

/// A step's free-form configuration payload.
///
/// Semantically a JSON object; values may be strings, numbers, booleans, or
/// nested objects. Unknown fields are ignored, missing required fields fail
/// the step via [`StepError::MissingConfiguration`].
#[derive(Debug, Clone, Default)]
pub struct StepPayload(Map<String, Value>);

impl StepPayload {
    /// Build a payload from an arbitrary JSON value. Anything that is not an
    /// object yields an empty payload, so required-field checks fail with a
    /// configuration error rather than a deserialization panic.
    pub fn from_value(value: &Value) -> Self {
        match value.as_object() {
            Some(map) => Self(map.clone()),
            None => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The field as a string, if present and actually a string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The field as a string, or `MissingConfiguration` if absent or of the
    /// wrong shape.
    pub fn require_str(&self, field: &'static str) -> Result<&str, StepError> {
        self.str_field(field)
            .ok_or(StepError::MissingConfiguration { field })
    }

    /// The payload as a JSON value (for logging and test assertions).
    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// The core step trait.
///
/// Handlers receive the current data context and return the context for the
/// next step; returning it unchanged is a valid no-op.
#[async_trait]
pub trait StepHandler: Send + Sync {
    async fn execute(
        &self,
        payload: &StepPayload,
        ctx: DataContext,
    ) -> Result<DataContext, StepError>;
}
