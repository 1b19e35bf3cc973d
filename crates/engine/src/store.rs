//! Storage contracts consumed by the engine, and their Postgres adapters.
//!
//! The engine talks to durable storage through two narrow traits: the
//! read-only [`WorkflowStore`] and the append-only [`ExecutionLedger`].
//! Production wires in the Postgres adapters below; tests substitute
//! in-memory implementations.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use db::models::{StepRow, WorkflowRow};
use db::{DbError, DbPool};

use crate::models::{RunReport, RunStatus, Step, StepType, Workflow};

// ---------------------------------------------------------------------------
// Contract types
// ---------------------------------------------------------------------------

/// One row of the scheduled-workflows enumeration: a workflow carrying an
/// active `trigger` step with `triggerType == "schedule"`.
#[derive(Debug, Clone)]
pub struct ScheduledWorkflow {
    pub id: Uuid,
    pub name: String,
    pub frequency: String,
    pub active: bool,
}

/// An outcome to append to the ledger.
#[derive(Debug, Clone)]
pub struct ExecutionEntry {
    pub workflow_id: Uuid,
    pub status: RunStatus,
    pub message: String,
    pub executed_at: DateTime<Utc>,
    pub duration: Option<Duration>,
}

impl ExecutionEntry {
    pub fn from_report(workflow_id: Uuid, report: &RunReport) -> Self {
        Self {
            workflow_id,
            status: report.status,
            message: report.message.clone(),
            executed_at: Utc::now(),
            duration: Some(report.duration),
        }
    }
}

/// A recorded outcome, as read back for operational reporting.
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub status: RunStatus,
    pub message: String,
    pub executed_at: DateTime<Utc>,
    pub duration_ms: Option<i64>,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read-only access to workflow definitions. The engine never writes
/// workflow or step rows.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Workflows with a schedule trigger, for scheduler startup.
    async fn scheduled_workflows(&self) -> Result<Vec<ScheduledWorkflow>, DbError>;

    /// Load a workflow with its steps ordered ascending.
    /// `DbError::NotFound` when the id does not exist.
    async fn workflow(&self, id: Uuid) -> Result<Workflow, DbError>;

    /// Resolve a workflow from its webhook token.
    async fn workflow_by_webhook(&self, token: &str) -> Result<Workflow, DbError>;
}

/// Append-only record of run outcomes. No update or delete operation exists.
#[async_trait]
pub trait ExecutionLedger: Send + Sync {
    /// Append one outcome; returns the record id.
    async fn record(&self, entry: ExecutionEntry) -> Result<Uuid, DbError>;

    /// A workflow's records, most recent first, bounded by `limit`.
    async fn recent(&self, workflow_id: Uuid, limit: i64)
        -> Result<Vec<ExecutionRecord>, DbError>;

    /// Count of records across all workflows since the given instant.
    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, DbError>;
}

// ---------------------------------------------------------------------------
// Postgres adapters
// ---------------------------------------------------------------------------

fn workflow_from_rows(row: WorkflowRow, step_rows: Vec<StepRow>) -> Workflow {
    let steps = step_rows
        .into_iter()
        .map(|s| Step {
            id: s.id,
            workflow_id: s.workflow_id,
            name: s.name,
            step_type: StepType::from(s.step_type),
            payload: s.payload,
            step_order: s.step_order,
        })
        .collect();

    Workflow {
        id: row.id,
        name: row.name,
        user_id: row.user_id,
        webhook_token: row.webhook_token,
        active: row.active,
        steps,
        created_at: row.created_at,
    }
}

/// [`WorkflowStore`] backed by the `workflows`/`steps` tables.
pub struct PgWorkflowStore {
    pool: DbPool,
}

impl PgWorkflowStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowStore for PgWorkflowStore {
    async fn scheduled_workflows(&self) -> Result<Vec<ScheduledWorkflow>, DbError> {
        let rows = db::repository::workflows::list_scheduled_workflows(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|r| ScheduledWorkflow {
                id: r.id,
                name: r.name,
                frequency: r.frequency,
                active: r.active,
            })
            .collect())
    }

    async fn workflow(&self, id: Uuid) -> Result<Workflow, DbError> {
        let row = db::repository::workflows::get_workflow(&self.pool, id).await?;
        let steps = db::repository::workflows::list_steps(&self.pool, row.id).await?;
        Ok(workflow_from_rows(row, steps))
    }

    async fn workflow_by_webhook(&self, token: &str) -> Result<Workflow, DbError> {
        let row = db::repository::workflows::get_workflow_by_webhook(&self.pool, token).await?;
        let steps = db::repository::workflows::list_steps(&self.pool, row.id).await?;
        Ok(workflow_from_rows(row, steps))
    }
}

/// [`ExecutionLedger`] backed by the `workflow_executions` table.
pub struct PgExecutionLedger {
    pool: DbPool,
}

impl PgExecutionLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExecutionLedger for PgExecutionLedger {
    async fn record(&self, entry: ExecutionEntry) -> Result<Uuid, DbError> {
        let duration_ms = entry.duration.map(|d| d.as_millis() as i64);
        db::repository::executions::record_execution(
            &self.pool,
            entry.workflow_id,
            &entry.status.to_string(),
            &entry.message,
            entry.executed_at,
            duration_ms,
        )
        .await
    }

    async fn recent(
        &self,
        workflow_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ExecutionRecord>, DbError> {
        let rows =
            db::repository::executions::list_executions(&self.pool, workflow_id, limit).await?;
        Ok(rows
            .into_iter()
            .map(|r| ExecutionRecord {
                id: r.id,
                workflow_id: r.workflow_id,
                // Rows are written from `RunStatus::to_string`; anything else
                // in the column is treated as a failure.
                status: r.status.parse().unwrap_or(RunStatus::Failure),
                message: r.message,
                executed_at: r.executed_at,
                duration_ms: r.duration_ms,
            })
            .collect())
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, DbError> {
        db::repository::executions::count_executions_since(&self.pool, since).await
    }
}
