//! Execution ledger repository.
//!
//! The `workflow_executions` table is append-only: rows are inserted once and
//! never updated or deleted. The read-side queries feed operational status
//! reporting and sit off the execution-critical path.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ExecutionRow;
use crate::DbError;

/// Append one execution outcome and return its id.
pub async fn record_execution(
    pool: &PgPool,
    workflow_id: Uuid,
    status: &str,
    message: &str,
    executed_at: DateTime<Utc>,
    duration_ms: Option<i64>,
) -> Result<Uuid, DbError> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO workflow_executions (id, workflow_id, status, message, executed_at, duration_ms)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(workflow_id)
    .bind(status)
    .bind(message)
    .bind(executed_at)
    .bind(duration_ms)
    .execute(pool)
    .await?;

    Ok(id)
}

/// List a workflow's executions, most recent first, bounded by `limit`.
pub async fn list_executions(
    pool: &PgPool,
    workflow_id: Uuid,
    limit: i64,
) -> Result<Vec<ExecutionRow>, DbError> {
    let rows = sqlx::query_as::<_, ExecutionRow>(
        r#"
        SELECT id, workflow_id, status, message, executed_at, duration_ms
        FROM workflow_executions
        WHERE workflow_id = $1
        ORDER BY executed_at DESC
        LIMIT $2
        "#,
    )
    .bind(workflow_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count executions recorded since the given instant, across all workflows.
pub async fn count_executions_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<i64, DbError> {
    let count: (i64,) = sqlx::query_as(
        r#"SELECT COUNT(*) FROM workflow_executions WHERE executed_at >= $1"#,
    )
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(count.0)
}
