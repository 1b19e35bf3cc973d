//! The `action` step — terminal side effects delivered through a sink.
//!
//! The handler validates the payload for the dispatched `actionType` and
//! builds a typed [`ActionRequest`]; actual delivery (HTTP call, SQL write,
//! outbound mail) is delegated to an [`ActionSink`]. The default sink only
//! logs the delivery, which is what operational environments without outbound
//! integrations run with.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{DataContext, StepError, StepHandler, StepPayload};

/// Database operations the `database` action accepts.
const DATABASE_OPERATIONS: [&str; 3] = ["insert", "update", "upsert"];

/// A validated, typed action ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    Database { table: String, operation: String },
    ApiCall { url: String, method: String },
    Email { to: String, subject: String },
}

/// Delivers an [`ActionRequest`] to the outside world.
///
/// A sink failure surfaces as [`StepError::Upstream`], which aborts the run;
/// it is retried only by the next scheduled tick, never within the same run.
#[async_trait]
pub trait ActionSink: Send + Sync {
    async fn deliver(&self, request: &ActionRequest, ctx: &DataContext) -> Result<(), StepError>;
}

/// Default sink: logs the would-be delivery and succeeds.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl ActionSink for LogSink {
    async fn deliver(&self, request: &ActionRequest, _ctx: &DataContext) -> Result<(), StepError> {
        match request {
            ActionRequest::Database { table, operation } => {
                info!(table, operation, "database action");
            }
            ActionRequest::ApiCall { url, method } => {
                info!(url, method, "api_call action");
            }
            ActionRequest::Email { to, subject } => {
                info!(to, subject, "email action");
            }
        }
        Ok(())
    }
}

/// Executes `action` steps, dispatching on the payload's `actionType`.
pub struct ActionHandler {
    sink: Arc<dyn ActionSink>,
}

impl ActionHandler {
    pub fn new() -> Self {
        Self {
            sink: Arc::new(LogSink),
        }
    }

    pub fn with_sink(sink: Arc<dyn ActionSink>) -> Self {
        Self { sink }
    }
}

impl Default for ActionHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StepHandler for ActionHandler {
    async fn execute(
        &self,
        payload: &StepPayload,
        ctx: DataContext,
    ) -> Result<DataContext, StepError> {
        let request = match payload.str_field("actionType") {
            Some("database") => {
                let table = payload.require_str("table")?.to_owned();
                let operation = payload.require_str("operation")?.to_owned();
                if !DATABASE_OPERATIONS.contains(&operation.as_str()) {
                    return Err(StepError::UnsupportedDestination(operation));
                }
                ActionRequest::Database { table, operation }
            }
            Some("api_call") => ActionRequest::ApiCall {
                url: payload.require_str("url")?.to_owned(),
                method: payload.require_str("method")?.to_owned(),
            },
            Some("email") => ActionRequest::Email {
                to: payload.require_str("to")?.to_owned(),
                subject: payload.require_str("subject")?.to_owned(),
            },
            Some(other) => {
                warn!(action_type = other, "unknown action type, passing through");
                return Ok(ctx);
            }
            None => {
                warn!("action step without actionType, passing through");
                return Ok(ctx);
            }
        };

        self.sink.deliver(&request, &ctx).await?;
        Ok(ctx)
    }
}
