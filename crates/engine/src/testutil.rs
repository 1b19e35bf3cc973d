//! In-memory storage doubles and fixtures shared by the engine's tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use db::DbError;
use steps::{ActionRequest, ActionSink, DataContext, StepError};

use crate::models::{Step, StepType, Workflow};
use crate::store::{
    ExecutionEntry, ExecutionLedger, ExecutionRecord, ScheduledWorkflow, WorkflowStore,
};

/// Build a step with fresh ids for test workflows.
pub fn step(name: &str, step_type: &str, payload: Value, order: i32) -> Step {
    Step {
        id: Uuid::new_v4(),
        workflow_id: Uuid::new_v4(),
        name: name.to_owned(),
        step_type: StepType::from(step_type),
        payload,
        step_order: order,
    }
}

/// In-memory [`WorkflowStore`].
#[derive(Default)]
pub struct MemoryStore {
    workflows: HashMap<Uuid, Workflow>,
    scheduled: Vec<ScheduledWorkflow>,
}

impl MemoryStore {
    pub fn with_workflow(workflow: Workflow) -> Self {
        let mut store = Self::default();
        store.add(workflow);
        store
    }

    pub fn add(&mut self, workflow: Workflow) {
        self.workflows.insert(workflow.id, workflow);
    }

    pub fn add_scheduled(&mut self, workflow: ScheduledWorkflow) {
        self.scheduled.push(workflow);
    }
}

#[async_trait]
impl WorkflowStore for MemoryStore {
    async fn scheduled_workflows(&self) -> Result<Vec<ScheduledWorkflow>, DbError> {
        Ok(self.scheduled.clone())
    }

    async fn workflow(&self, id: Uuid) -> Result<Workflow, DbError> {
        self.workflows.get(&id).cloned().ok_or(DbError::NotFound)
    }

    async fn workflow_by_webhook(&self, token: &str) -> Result<Workflow, DbError> {
        self.workflows
            .values()
            .find(|w| w.webhook_token == token)
            .cloned()
            .ok_or(DbError::NotFound)
    }
}

/// In-memory [`ExecutionLedger`], optionally failing every write.
#[derive(Default)]
pub struct MemoryLedger {
    entries: Mutex<Vec<ExecutionEntry>>,
    fail_writes: bool,
}

impl MemoryLedger {
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            fail_writes: true,
        }
    }

    pub fn entries(&self) -> Vec<ExecutionEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionLedger for MemoryLedger {
    async fn record(&self, entry: ExecutionEntry) -> Result<Uuid, DbError> {
        if self.fail_writes {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        self.entries.lock().unwrap().push(entry);
        Ok(Uuid::new_v4())
    }

    async fn recent(
        &self,
        workflow_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ExecutionRecord>, DbError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .rev()
            .filter(|e| e.workflow_id == workflow_id)
            .take(limit as usize)
            .map(|e| ExecutionRecord {
                id: Uuid::new_v4(),
                workflow_id: e.workflow_id,
                status: e.status,
                message: e.message.clone(),
                executed_at: e.executed_at,
                duration_ms: e.duration.map(|d| d.as_millis() as i64),
            })
            .collect())
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, DbError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.iter().filter(|e| e.executed_at >= since).count() as i64)
    }
}

/// Far longer than any timeout bound under test; the paused tokio clock
/// skips over it instantly.
const STALL: Duration = Duration::from_secs(3600);

/// [`WorkflowStore`] that never answers within a timeout bound.
pub struct StallingStore;

#[async_trait]
impl WorkflowStore for StallingStore {
    async fn scheduled_workflows(&self) -> Result<Vec<ScheduledWorkflow>, DbError> {
        tokio::time::sleep(STALL).await;
        Ok(Vec::new())
    }

    async fn workflow(&self, _id: Uuid) -> Result<Workflow, DbError> {
        tokio::time::sleep(STALL).await;
        Err(DbError::NotFound)
    }

    async fn workflow_by_webhook(&self, _token: &str) -> Result<Workflow, DbError> {
        tokio::time::sleep(STALL).await;
        Err(DbError::NotFound)
    }
}

/// [`ExecutionLedger`] whose writes never answer within a timeout bound.
pub struct StallingLedger;

#[async_trait]
impl ExecutionLedger for StallingLedger {
    async fn record(&self, _entry: ExecutionEntry) -> Result<Uuid, DbError> {
        tokio::time::sleep(STALL).await;
        Ok(Uuid::new_v4())
    }

    async fn recent(
        &self,
        _workflow_id: Uuid,
        _limit: i64,
    ) -> Result<Vec<ExecutionRecord>, DbError> {
        Ok(Vec::new())
    }

    async fn count_since(&self, _since: DateTime<Utc>) -> Result<i64, DbError> {
        Ok(0)
    }
}

/// [`ActionSink`] that counts deliveries.
#[derive(Default)]
pub struct CountingSink {
    delivered: Mutex<Vec<ActionRequest>>,
}

impl CountingSink {
    pub fn delivery_count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

#[async_trait]
impl ActionSink for CountingSink {
    async fn deliver(&self, request: &ActionRequest, _ctx: &DataContext) -> Result<(), StepError> {
        self.delivered.lock().unwrap().push(request.clone());
        Ok(())
    }
}
