//! The `filter` step — condition/validation gates.
//!
//! A filter never mutates the context. Condition evaluation is a pluggable
//! seam: without a registered predicate (and under the current policy, even
//! with one) the run always continues; a future short-circuit would reject
//! the run here without it counting as a failure.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::{DataContext, StepError, StepHandler, StepPayload};

/// Evaluates a `field operator value` comparison against the current context.
pub trait ConditionPredicate: Send + Sync {
    fn evaluate(
        &self,
        field: &str,
        operator: &str,
        value: &Value,
        ctx: &DataContext,
    ) -> Result<bool, StepError>;
}

/// Executes `filter` steps, dispatching on the payload's `filterType`.
#[derive(Default)]
pub struct FilterHandler {
    predicate: Option<Arc<dyn ConditionPredicate>>,
}

impl FilterHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predicate(mut self, predicate: Arc<dyn ConditionPredicate>) -> Self {
        self.predicate = Some(predicate);
        self
    }
}

#[async_trait]
impl StepHandler for FilterHandler {
    async fn execute(
        &self,
        payload: &StepPayload,
        ctx: DataContext,
    ) -> Result<DataContext, StepError> {
        match payload.str_field("filterType") {
            Some("condition") => {
                let field = payload.require_str("field")?;
                let operator = payload.require_str("operator")?;
                let value = payload
                    .get("value")
                    .ok_or(StepError::MissingConfiguration { field: "value" })?;

                match &self.predicate {
                    Some(predicate) => {
                        let held = predicate.evaluate(field, operator, value, &ctx)?;
                        if held {
                            debug!(field, operator, "condition held");
                        } else {
                            info!(field, operator, "condition did not hold, passing through");
                        }
                    }
                    None => debug!(field, operator, "no predicate registered, passing through"),
                }
            }
            Some("validation") => {
                // Validation gates currently always pass.
                debug!("validation filter passed");
            }
            Some(other) => debug!(filter_type = other, "unknown filter type, passing through"),
            None => debug!("filter step without filterType, passing through"),
        }

        Ok(ctx)
    }
}
