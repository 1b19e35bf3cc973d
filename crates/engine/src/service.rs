//! `ExecutionService` — the entry points for both invocation sources.
//!
//! Scheduled ticks and webhook calls both end up here: load the workflow,
//! seed the data context, drive the pipeline runner, append one ledger
//! entry. Every store and ledger await is bounded by a timeout, so a wedged
//! connection cannot hang a job's task. Ledger faults are logged and
//! swallowed — they must never fail an otherwise-successful run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use steps::DataContext;

use crate::models::{InvocationSource, RunReport, Workflow};
use crate::runner::PipelineRunner;
use crate::store::{ExecutionEntry, ExecutionLedger, WorkflowStore};
use crate::EngineError;

/// Tuning knobs for the service's storage calls.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Upper bound on a single store or ledger call. Elapsing counts as an
    /// upstream failure.
    pub storage_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            storage_timeout: Duration::from_secs(10),
        }
    }
}

pub struct ExecutionService {
    store: Arc<dyn WorkflowStore>,
    ledger: Arc<dyn ExecutionLedger>,
    runner: PipelineRunner,
    config: ServiceConfig,
}

impl ExecutionService {
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        ledger: Arc<dyn ExecutionLedger>,
        runner: PipelineRunner,
    ) -> Self {
        Self::with_config(store, ledger, runner, ServiceConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn WorkflowStore>,
        ledger: Arc<dyn ExecutionLedger>,
        runner: PipelineRunner,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            runner,
            config,
        }
    }

    /// Execute one scheduled tick of a workflow.
    ///
    /// Always returns a report and always appends one ledger entry — a
    /// workflow that fails to load (or whose load times out) is still a
    /// recorded failure.
    pub async fn run_scheduled(
        &self,
        workflow_id: Uuid,
        cancel: &CancellationToken,
    ) -> RunReport {
        info!(%workflow_id, "executing scheduled workflow");

        let loaded = self
            .bounded("load workflow", self.store.workflow(workflow_id))
            .await;
        let workflow = match loaded {
            Ok(workflow) => workflow,
            Err(cause) => {
                error!(%workflow_id, %cause, "failed to load workflow for scheduled run");
                let report = RunReport::failure(
                    format!("failed to load workflow: {cause}"),
                    Duration::ZERO,
                );
                self.record_outcome(workflow_id, &report).await;
                return report;
            }
        };

        let source = InvocationSource::Scheduled;
        let ctx = DataContext::seeded(source.trigger_type(), workflow_id);
        let report = self.runner.run(&workflow, ctx, source, cancel).await;
        self.record_outcome(workflow_id, &report).await;
        report
    }

    /// Execute a webhook-triggered run.
    ///
    /// The JSON body's top-level fields and the path of an uploaded file (if
    /// any) become part of the initial data context; the run metadata keys
    /// win any collision. `DbError::NotFound` for an unknown token propagates
    /// to the caller, which owns the HTTP-facing response.
    pub async fn run_webhook(
        &self,
        webhook_token: &str,
        body: serde_json::Value,
        upload: Option<PathBuf>,
        cancel: &CancellationToken,
    ) -> Result<RunReport, EngineError> {
        let workflow = self
            .bounded(
                "resolve webhook token",
                self.store.workflow_by_webhook(webhook_token),
            )
            .await?;
        info!(workflow_id = %workflow.id, "executing webhook-triggered workflow");

        let source = InvocationSource::Webhook;
        let mut ctx = DataContext::new();
        ctx.merge_object(&body);
        if let Some(path) = upload {
            ctx.insert("file_path", json!(path.display().to_string()));
        }
        ctx.seed(source.trigger_type(), workflow.id);

        let report = self.runner.run(&workflow, ctx, source, cancel).await;
        self.record_outcome(workflow.id, &report).await;
        Ok(report)
    }

    /// Bound one store call by the configured storage timeout.
    async fn bounded<F>(&self, operation: &'static str, call: F) -> Result<Workflow, EngineError>
    where
        F: std::future::Future<Output = Result<Workflow, db::DbError>>,
    {
        match timeout(self.config.storage_timeout, call).await {
            Ok(result) => result.map_err(EngineError::from),
            Err(_) => Err(EngineError::StorageTimeout {
                operation,
                timeout: self.config.storage_timeout,
            }),
        }
    }

    async fn record_outcome(&self, workflow_id: Uuid, report: &RunReport) {
        if let Some(ctx) = &report.context {
            debug!(%workflow_id, context = %ctx.clone().into_value(), "final context");
        }

        let entry = ExecutionEntry::from_report(workflow_id, report);
        match timeout(self.config.storage_timeout, self.ledger.record(entry)).await {
            Ok(Ok(_)) => {}
            Ok(Err(cause)) => warn!(%workflow_id, %cause, "failed to record execution outcome"),
            Err(_) => warn!(
                %workflow_id,
                timeout = ?self.config.storage_timeout,
                "execution record write timed out"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use serde_json::json;

    use crate::models::RunStatus;
    use crate::runner::{builtin_registry, RunnerConfig};
    use crate::testutil::{step, MemoryLedger, MemoryStore, StallingLedger, StallingStore};
    use crate::Workflow;

    fn service_with(
        store: MemoryStore,
        ledger: Arc<MemoryLedger>,
    ) -> ExecutionService {
        ExecutionService::new(
            Arc::new(store),
            ledger,
            PipelineRunner::new(builtin_registry(), RunnerConfig::default()),
        )
    }

    fn tight_storage() -> ServiceConfig {
        ServiceConfig {
            storage_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn failed_step_produces_a_failure_record_naming_the_step() {
        let workflow = Workflow::new(
            "broken action",
            vec![step(
                "notify partner",
                "action",
                json!({ "actionType": "api_call", "method": "POST" }),
                1,
            )],
        );
        let workflow_id = workflow.id;

        let ledger = Arc::new(MemoryLedger::default());
        let service = service_with(MemoryStore::with_workflow(workflow), ledger.clone());

        let report = service
            .run_scheduled(workflow_id, &CancellationToken::new())
            .await;

        assert_eq!(report.status, RunStatus::Failure);

        let entries = ledger.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, RunStatus::Failure);
        assert!(entries[0].message.contains("notify partner"));
        assert!(entries[0].message.contains("url"));
    }

    #[tokio::test]
    async fn unloadable_workflow_still_gets_a_failure_record() {
        let ledger = Arc::new(MemoryLedger::default());
        let service = service_with(MemoryStore::default(), ledger.clone());

        let report = service
            .run_scheduled(Uuid::new_v4(), &CancellationToken::new())
            .await;

        assert_eq!(report.status, RunStatus::Failure);
        let entries = ledger.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].message.contains("failed to load workflow"));
    }

    #[tokio::test]
    async fn ledger_write_failure_does_not_change_the_outcome() {
        let workflow = Workflow::new(
            "healthy",
            vec![step("note parse", "parse", json!({ "parseType": "json" }), 1)],
        );
        let workflow_id = workflow.id;

        let ledger = Arc::new(MemoryLedger::failing());
        let service = service_with(MemoryStore::with_workflow(workflow), ledger);

        let report = service
            .run_scheduled(workflow_id, &CancellationToken::new())
            .await;

        assert!(report.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_workflow_load_times_out_as_a_recorded_failure() {
        let ledger = Arc::new(MemoryLedger::default());
        let service = ExecutionService::with_config(
            Arc::new(StallingStore),
            ledger.clone(),
            PipelineRunner::with_defaults(),
            tight_storage(),
        );

        let report = service
            .run_scheduled(Uuid::new_v4(), &CancellationToken::new())
            .await;

        assert_eq!(report.status, RunStatus::Failure);
        assert!(report.message.contains("timed out"));

        let entries = ledger.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, RunStatus::Failure);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_ledger_write_does_not_hang_the_run() {
        let workflow = Workflow::new(
            "healthy",
            vec![step("note parse", "parse", json!({ "parseType": "json" }), 1)],
        );
        let workflow_id = workflow.id;

        let service = ExecutionService::with_config(
            Arc::new(MemoryStore::with_workflow(workflow)),
            Arc::new(StallingLedger),
            PipelineRunner::with_defaults(),
            tight_storage(),
        );

        let report = service
            .run_scheduled(workflow_id, &CancellationToken::new())
            .await;

        assert!(report.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_webhook_lookup_times_out_as_storage_timeout() {
        let service = ExecutionService::with_config(
            Arc::new(StallingStore),
            Arc::new(MemoryLedger::default()),
            PipelineRunner::with_defaults(),
            tight_storage(),
        );

        let result = service
            .run_webhook("some-token", json!({}), None, &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(EngineError::StorageTimeout { .. })));
    }

    #[tokio::test]
    async fn webhook_body_is_merged_but_run_metadata_wins() {
        let workflow = Workflow::new(
            "webhook target",
            vec![step("gate", "filter", json!({ "filterType": "validation" }), 1)],
        );
        let token = workflow.webhook_token.clone();
        let workflow_id = workflow.id;

        let ledger = Arc::new(MemoryLedger::default());
        let service = service_with(MemoryStore::with_workflow(workflow), ledger.clone());

        let report = service
            .run_webhook(
                &token,
                json!({ "order_id": 42, "trigger_type": "spoofed" }),
                Some(PathBuf::from("/tmp/upload.csv")),
                &CancellationToken::new(),
            )
            .await
            .expect("token resolves");

        let ctx = report.context.expect("successful run keeps its context");
        assert_eq!(ctx.get("order_id"), Some(&json!(42)));
        assert_eq!(ctx.get("file_path"), Some(&json!("/tmp/upload.csv")));
        assert_eq!(ctx.get("trigger_type"), Some(&json!("webhook")));
        assert_eq!(ctx.get("workflow_id"), Some(&json!(workflow_id.to_string())));
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.entries()[0].status, RunStatus::Success);
    }

    #[tokio::test]
    async fn unknown_webhook_token_propagates_not_found() {
        let service = service_with(MemoryStore::default(), Arc::new(MemoryLedger::default()));

        let result = service
            .run_webhook("no-such-token", json!({}), None, &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(EngineError::Storage(db::DbError::NotFound))
        ));
    }

    #[tokio::test]
    async fn ledger_reads_page_most_recent_first_and_count_by_cutoff() {
        let ledger = MemoryLedger::default();
        let workflow_a = Uuid::new_v4();
        let workflow_b = Uuid::new_v4();
        let t0 = Utc::now();

        for (workflow_id, offset_secs, message) in [
            (workflow_a, 0, "first run"),
            (workflow_b, 1, "other workflow"),
            (workflow_a, 2, "second run"),
        ] {
            ledger
                .record(ExecutionEntry {
                    workflow_id,
                    status: RunStatus::Success,
                    message: message.to_owned(),
                    executed_at: t0 + chrono::Duration::seconds(offset_secs),
                    duration: None,
                })
                .await
                .expect("record succeeds");
        }

        let page = ledger.recent(workflow_a, 1).await.expect("recent succeeds");
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].message, "second run");

        let all = ledger.recent(workflow_a, 10).await.expect("recent succeeds");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].message, "second run");
        assert_eq!(all[1].message, "first run");

        let since_t1 = ledger
            .count_since(t0 + chrono::Duration::seconds(1))
            .await
            .expect("count succeeds");
        assert_eq!(since_t1, 2);

        let since_future = ledger
            .count_since(t0 + chrono::Duration::seconds(10))
            .await
            .expect("count succeeds");
        assert_eq!(since_future, 0);
    }
}
