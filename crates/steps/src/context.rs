//! The data context threaded through one pipeline run.

use chrono::Utc;
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Step-to-step key/value state, owned exclusively by one pipeline run.
///
/// Handlers receive the context by value and return a (possibly unchanged)
/// context; replacement rather than shared mutation keeps concurrent runs of
/// the same workflow independent without locking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataContext(Map<String, Value>);

impl DataContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The initial context for a run: `trigger_type`, `timestamp`, and
    /// `workflow_id` are always present.
    pub fn seeded(trigger_type: &str, workflow_id: Uuid) -> Self {
        let mut ctx = Self::new();
        ctx.seed(trigger_type, workflow_id);
        ctx
    }

    /// (Re-)insert the run metadata keys. Applied after merging caller input
    /// so the metadata always wins a key collision.
    pub fn seed(&mut self, trigger_type: &str, workflow_id: Uuid) {
        self.insert("trigger_type", json!(trigger_type));
        self.insert("timestamp", json!(Utc::now().to_rfc3339()));
        self.insert("workflow_id", json!(workflow_id.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy the top-level fields of a JSON object into the context.
    /// Non-object values are ignored.
    pub fn merge_object(&mut self, value: &Value) {
        if let Some(fields) = value.as_object() {
            for (key, val) in fields {
                self.0.insert(key.clone(), val.clone());
            }
        }
    }

    /// The context as a JSON object (for logging the final state of a run).
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
