//! `MockHandler` — a test double for `StepHandler`.
//!
//! Useful in unit and integration tests where a real handler implementation
//! is either unavailable or irrelevant; records every call it receives.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::{DataContext, StepError, StepHandler, StepPayload};

/// Behaviour injected into `MockHandler` at construction time.
pub enum MockBehaviour {
    /// Return the context unchanged.
    PassThrough,
    /// Insert a key into the context before returning it.
    InsertKey(String, Value),
    /// Fail with the given error.
    Fail(StepError),
}

/// A mock handler that records every payload it sees and returns a
/// programmer-specified result.
pub struct MockHandler {
    /// Label used in test assertions.
    pub name: String,
    /// What the handler will do when `execute` is called.
    pub behaviour: MockBehaviour,
    /// All payloads seen by this handler (in call order).
    pub calls: Arc<Mutex<Vec<Value>>>,
}

impl MockHandler {
    /// Create a mock that passes the context through unchanged.
    pub fn passthrough(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::PassThrough,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that inserts `key = value` into the context.
    pub fn inserting(name: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::InsertKey(key.into(), value),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that always fails with the given error.
    pub fn failing(name: impl Into<String>, error: StepError) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::Fail(error),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of times this handler has been executed.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The payloads seen so far, in call order.
    pub fn recorded_payloads(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StepHandler for MockHandler {
    async fn execute(
        &self,
        payload: &StepPayload,
        mut ctx: DataContext,
    ) -> Result<DataContext, StepError> {
        self.calls.lock().unwrap().push(payload.as_value());

        match &self.behaviour {
            MockBehaviour::PassThrough => Ok(ctx),
            MockBehaviour::InsertKey(key, value) => {
                ctx.insert(key.clone(), value.clone());
                Ok(ctx)
            }
            MockBehaviour::Fail(error) => Err(error.clone()),
        }
    }
}
