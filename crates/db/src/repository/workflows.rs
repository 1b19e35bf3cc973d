//! Read-side workflow and step queries.
//!
//! The engine never writes workflow or step rows; creation and editing are
//! the management API's job. Everything here is a plain `SELECT`.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ScheduledWorkflowRow, StepRow, WorkflowRow};
use crate::DbError;

/// Fetch a single workflow by its primary key.
pub async fn get_workflow(pool: &PgPool, id: Uuid) -> Result<WorkflowRow, DbError> {
    let row = sqlx::query_as::<_, WorkflowRow>(
        r#"
        SELECT id, name, user_id, webhook_token, active, created_at
        FROM workflows
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Fetch a workflow by its webhook token (the external trigger address).
pub async fn get_workflow_by_webhook(pool: &PgPool, token: &str) -> Result<WorkflowRow, DbError> {
    let row = sqlx::query_as::<_, WorkflowRow>(
        r#"
        SELECT id, name, user_id, webhook_token, active, created_at
        FROM workflows
        WHERE webhook_token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Return all steps of a workflow in ascending `step_order`.
pub async fn list_steps(pool: &PgPool, workflow_id: Uuid) -> Result<Vec<StepRow>, DbError> {
    let rows = sqlx::query_as::<_, StepRow>(
        r#"
        SELECT id, workflow_id, name, step_type, payload, step_order
        FROM steps
        WHERE workflow_id = $1
        ORDER BY step_order ASC
        "#,
    )
    .bind(workflow_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Return every workflow that carries a `trigger` step whose payload declares
/// `triggerType == "schedule"`, along with the trigger's frequency string.
pub async fn list_scheduled_workflows(pool: &PgPool) -> Result<Vec<ScheduledWorkflowRow>, DbError> {
    let rows = sqlx::query_as::<_, ScheduledWorkflowRow>(
        r#"
        SELECT DISTINCT w.id, w.name, s.payload->>'frequency' AS frequency, w.active
        FROM workflows w
        JOIN steps s ON w.id = s.workflow_id
        WHERE s.step_type = 'trigger'
          AND s.payload->>'triggerType' = 'schedule'
          AND s.payload->>'frequency' IS NOT NULL
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
