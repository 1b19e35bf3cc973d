//! Workflow execution engine: schedule translation, recurring-job
//! registration, step-pipeline execution, and the execution ledger.
//!
//! The flow through the crate: the [`Scheduler`] registers one recurring job
//! per schedule-triggered workflow; each tick (or an inbound webhook) reaches
//! the [`ExecutionService`], which loads the workflow through a
//! [`WorkflowStore`], drives the [`PipelineRunner`] over the ordered steps,
//! and appends the outcome to the [`ExecutionLedger`].

pub mod error;
pub mod models;
pub mod runner;
pub mod schedule;
pub mod scheduler;
pub mod service;
pub mod store;

#[cfg(test)]
mod testutil;

pub use error::EngineError;
pub use models::{InvocationSource, RunReport, RunStatus, Step, StepType, Workflow};
pub use runner::{builtin_registry, HandlerRegistry, PipelineRunner, RunnerConfig};
pub use schedule::{parse_schedule, recurrence_expression};
pub use scheduler::{job_name, Scheduler};
pub use service::{ExecutionService, ServiceConfig};
pub use store::{
    ExecutionEntry, ExecutionLedger, ExecutionRecord, PgExecutionLedger, PgWorkflowStore,
    ScheduledWorkflow, WorkflowStore,
};
