//! The `trigger` step — an identity transform.
//!
//! On a webhook invocation the trigger step runs like any other step,
//! reserved for trigger-specific context enrichment. On a scheduled
//! invocation the runner skips trigger steps entirely (the schedule itself
//! already fired), so this handler is never re-entered there.

use async_trait::async_trait;

use crate::{DataContext, StepError, StepHandler, StepPayload};

#[derive(Debug, Default)]
pub struct TriggerHandler;

#[async_trait]
impl StepHandler for TriggerHandler {
    async fn execute(
        &self,
        _payload: &StepPayload,
        ctx: DataContext,
    ) -> Result<DataContext, StepError> {
        Ok(ctx)
    }
}
