//! Connection pool construction and the migration runner.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::DbError;

/// The pool handle threaded through every repository function. Shared by
/// clone; sqlx pools are reference-counted internally.
pub type DbPool = PgPool;

/// Open a pool against `database_url`, capped at `max_connections`.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, DbError> {
    info!(max_connections, "opening database pool");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Apply the workspace's `migrations/` directory, embedded at build time.
/// Safe to call on every startup; already-applied migrations are skipped.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    info!("applying pending migrations");
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}
