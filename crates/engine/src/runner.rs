//! The pipeline runner — the sequential interpreter for a workflow's steps.
//!
//! `PipelineRunner` drives the step handlers:
//! 1. Sorts steps by `step_order` and visits them strictly ascending.
//! 2. Skips `trigger` steps on scheduled invocations (the schedule itself is
//!    the trigger; re-entering trigger logic must not execute side effects).
//! 3. Dispatches each remaining step through the handler registry, bounded
//!    by a per-step timeout.
//! 4. Threads the data context: a handler's returned context replaces the
//!    current one for the next step.
//! 5. Aborts on the first failure; later steps never execute.
//!
//! The runner never writes the execution ledger — callers do — which keeps
//! it independently testable.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use steps::{
    ActionHandler, DataContext, FilterHandler, ParseHandler, StepError, StepHandler, StepPayload,
    TriggerHandler,
};

use crate::models::{InvocationSource, RunReport, Step, StepType, Workflow};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Upper bound on a single handler invocation. Elapsing counts as an
    /// upstream failure; no operation in the engine blocks indefinitely.
    pub step_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_secs(30),
        }
    }
}

// ---------------------------------------------------------------------------
// Handler registry
// ---------------------------------------------------------------------------

/// Maps step type tags to boxed `StepHandler` implementations. New step
/// types are added here without touching the runner.
pub type HandlerRegistry = HashMap<String, Arc<dyn StepHandler>>;

/// The registry of built-in handlers: `trigger`, `parse`, `filter`, `action`.
pub fn builtin_registry() -> HandlerRegistry {
    let mut registry: HandlerRegistry = HashMap::new();
    registry.insert("trigger".into(), Arc::new(TriggerHandler));
    registry.insert("parse".into(), Arc::new(ParseHandler::new()));
    registry.insert("filter".into(), Arc::new(FilterHandler::new()));
    registry.insert("action".into(), Arc::new(ActionHandler::new()));
    registry
}

// ---------------------------------------------------------------------------
// PipelineRunner
// ---------------------------------------------------------------------------

/// Stateless interpreter that runs one workflow's steps to completion.
pub struct PipelineRunner {
    registry: HandlerRegistry,
    config: RunnerConfig,
}

impl PipelineRunner {
    pub fn new(registry: HandlerRegistry, config: RunnerConfig) -> Self {
        Self { registry, config }
    }

    /// Built-in handlers with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(builtin_registry(), RunnerConfig::default())
    }

    /// Run the workflow's steps against `ctx` and return the outcome.
    ///
    /// Cancellation is honoured between steps; a step already in flight is
    /// bounded by the step timeout.
    #[instrument(skip(self, ctx, cancel), fields(workflow_id = %workflow.id, source = ?source))]
    pub async fn run(
        &self,
        workflow: &Workflow,
        mut ctx: DataContext,
        source: InvocationSource,
        cancel: &CancellationToken,
    ) -> RunReport {
        let started = std::time::Instant::now();

        // Storage is not trusted to return steps in order.
        let mut steps: Vec<&Step> = workflow.steps.iter().collect();
        steps.sort_by_key(|step| step.step_order);

        for step in steps {
            if cancel.is_cancelled() {
                warn!(step = %step.name, "run cancelled");
                return RunReport::failure(
                    format!("run cancelled before step '{}'", step.name),
                    started.elapsed(),
                );
            }

            if source == InvocationSource::Scheduled && step.step_type == StepType::Trigger {
                debug!(step = %step.name, "skipping trigger step on scheduled invocation");
                continue;
            }

            let Some(handler) = self.registry.get(step.step_type.as_str()) else {
                debug!(
                    step = %step.name,
                    step_type = %step.step_type,
                    "no handler registered, passing through"
                );
                continue;
            };

            let payload = StepPayload::from_value(&step.payload);
            let result = match timeout(
                self.config.step_timeout,
                handler.execute(&payload, ctx.clone()),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(StepError::Upstream(format!(
                    "timed out after {:?}",
                    self.config.step_timeout
                ))),
            };

            match result {
                Ok(next) => {
                    debug!(step = %step.name, "step succeeded");
                    ctx = next;
                }
                Err(cause) => {
                    error!(step = %step.name, %cause, "step failed, aborting run");
                    return RunReport::failure(
                        format!("step '{}' failed: {cause}", step.name),
                        started.elapsed(),
                    );
                }
            }
        }

        RunReport::success("execution completed", started.elapsed(), ctx)
    }
}
