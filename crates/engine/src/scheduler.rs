//! The scheduler — registers one recurring job per active schedule-triggered
//! workflow.
//!
//! One tokio task per job, sleeping until the next cron tick and then running
//! the workflow to completion before computing the following tick, so a
//! single workflow's scheduled runs never overlap. The job registry is an
//! explicitly owned map keyed by a deterministic job name, which makes
//! re-registration (process restart) idempotent, and `shutdown` a clean
//! teardown path.
//!
//! Scheduling assumes a single process instance; running replicas will
//! duplicate executions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::schedule::parse_schedule;
use crate::service::{ExecutionService, ServiceConfig};
use crate::store::{ScheduledWorkflow, WorkflowStore};
use crate::EngineError;

/// Deterministic job name for a workflow's recurring job.
pub fn job_name(workflow_id: Uuid) -> String {
    format!("workflow_{workflow_id}")
}

pub struct Scheduler {
    store: Arc<dyn WorkflowStore>,
    service: Arc<ExecutionService>,
    jobs: HashMap<String, JoinHandle<()>>,
    cancel: CancellationToken,
    storage_timeout: Duration,
}

impl Scheduler {
    pub fn new(store: Arc<dyn WorkflowStore>, service: Arc<ExecutionService>) -> Self {
        Self {
            store,
            service,
            jobs: HashMap::new(),
            cancel: CancellationToken::new(),
            storage_timeout: ServiceConfig::default().storage_timeout,
        }
    }

    /// Enumerate schedule-triggered workflows and register a job for each
    /// active one. A translation or registration failure is logged and skips
    /// only that workflow. Returns the number of jobs registered.
    pub async fn start(&mut self) -> Result<usize, EngineError> {
        let scheduled = tokio::time::timeout(
            self.storage_timeout,
            self.store.scheduled_workflows(),
        )
        .await
        .map_err(|_| EngineError::StorageTimeout {
            operation: "list scheduled workflows",
            timeout: self.storage_timeout,
        })??;

        let mut registered = 0;
        for workflow in &scheduled {
            if !workflow.active {
                debug!(workflow_id = %workflow.id, "workflow inactive, not scheduling");
                continue;
            }
            match self.register(workflow) {
                Ok(()) => registered += 1,
                Err(cause) => warn!(
                    workflow_id = %workflow.id,
                    name = %workflow.name,
                    %cause,
                    "schedule registration failed, skipping workflow"
                ),
            }
        }

        info!(registered, total = scheduled.len(), "scheduler started");
        Ok(registered)
    }

    /// Register (or replace) the recurring job for one workflow.
    pub fn register(&mut self, workflow: &ScheduledWorkflow) -> Result<(), EngineError> {
        let schedule = parse_schedule(&workflow.frequency)?;
        let name = job_name(workflow.id);

        // Job names are deterministic, so re-registering replaces the
        // previous timer instead of duplicating it.
        if let Some(previous) = self.jobs.remove(&name) {
            previous.abort();
        }

        info!(job = %name, frequency = %workflow.frequency, "registering recurring job");

        let service = Arc::clone(&self.service);
        let cancel = self.cancel.child_token();
        let workflow_id = workflow.id;

        let handle = tokio::spawn(async move {
            loop {
                let Some(next) = schedule.upcoming(Utc).next() else {
                    break;
                };
                let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(wait) => {}
                }

                let report = service.run_scheduled(workflow_id, &cancel).await;
                debug!(%workflow_id, status = %report.status, "scheduled run finished");
            }
        });

        self.jobs.insert(name, handle);
        Ok(())
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn job_names(&self) -> impl Iterator<Item = &str> {
        self.jobs.keys().map(String::as_str)
    }

    /// Cancel all timers and drop the registry.
    pub fn shutdown(&mut self) {
        info!(jobs = self.jobs.len(), "shutting down scheduler");
        self.cancel.cancel();
        for (_, handle) in self.jobs.drain() {
            handle.abort();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
