//! Row structs that map 1-to-1 onto database tables.
//!
//! These are *persistence* models — they carry no domain behaviour.
//! Domain types live in the `engine` crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// workflows
// ---------------------------------------------------------------------------

/// A persisted workflow row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowRow {
    pub id: Uuid,
    pub name: String,
    /// Owning user; nullable because ownership is managed by an external
    /// account service.
    pub user_id: Option<Uuid>,
    /// Opaque token identifying this workflow's inbound webhook address.
    pub webhook_token: String,
    /// Whether scheduled execution is enabled.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// steps
// ---------------------------------------------------------------------------

/// A persisted step row.
///
/// `step_type` and `payload` are stored untyped; the engine crate parses them
/// into domain types when loading a workflow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StepRow {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub name: String,
    pub step_type: String,
    /// Free-form JSON object configuring the step.
    pub payload: serde_json::Value,
    pub step_order: i32,
}

// ---------------------------------------------------------------------------
// workflow_executions
// ---------------------------------------------------------------------------

/// An append-only execution outcome row. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExecutionRow {
    pub id: Uuid,
    pub workflow_id: Uuid,
    /// `success` or `failure`.
    pub status: String,
    pub message: String,
    pub executed_at: DateTime<Utc>,
    pub duration_ms: Option<i64>,
}

// ---------------------------------------------------------------------------
// scheduled workflow projection
// ---------------------------------------------------------------------------

/// Projection returned by the scheduled-workflows query: one row per workflow
/// carrying a `trigger` step with `triggerType == "schedule"`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScheduledWorkflowRow {
    pub id: Uuid,
    pub name: String,
    /// Frequency string from the trigger payload (`hourly`, `daily`, … or a
    /// literal cron expression).
    pub frequency: String,
    pub active: bool,
}
