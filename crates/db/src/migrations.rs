//! Versioned, reversible schema migrations.
//!
//! Migration files live in `db/migrations/` at the workspace root as
//! `<version>_<name>.up.sql` / `<version>_<name>.down.sql` pairs and are
//! embedded at compile time. Applied versions are tracked by sqlx in the
//! `_sqlx_migrations` table.

use serde::Serialize;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::FromRow;

use crate::DbPool;
use qualityhub_core::types::Timestamp;

/// Every migration shipped with this build.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../db/migrations");

/// A row of the `_sqlx_migrations` bookkeeping table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppliedMigration {
    pub version: i64,
    pub description: String,
    pub success: bool,
    pub installed_on: Timestamp,
}

/// An embedded migration known to this build.
#[derive(Debug, Clone, Serialize)]
pub struct AvailableMigration {
    pub version: i64,
    pub description: String,
    pub reversible: bool,
}

/// Apply every pending migration.
pub async fn run_migrations(pool: &DbPool) -> Result<(), MigrateError> {
    tracing::info!(count = available_migrations().len(), "Running database migrations");
    MIGRATOR.run(pool).await
}

/// Undo every applied migration whose version is greater than `target`.
///
/// `target = 0` reverts the whole schema.
pub async fn revert_to(pool: &DbPool, target: i64) -> Result<(), MigrateError> {
    tracing::warn!(target, "Reverting database migrations");
    MIGRATOR.undo(pool, target).await
}

/// Undo only the most recently applied migration.
///
/// Returns the reverted version, or `None` when nothing is applied.
pub async fn revert_last(pool: &DbPool) -> Result<Option<i64>, MigrateError> {
    let applied = applied_migrations(pool).await?;
    let mut versions: Vec<i64> = applied.iter().map(|m| m.version).collect();
    versions.sort_unstable();

    let Some(last) = versions.pop() else {
        return Ok(None);
    };
    let target = versions.last().copied().unwrap_or(0);
    revert_to(pool, target).await?;
    Ok(Some(last))
}

/// List the migrations recorded as applied, oldest first.
///
/// Returns an empty list when the bookkeeping table does not exist yet.
pub async fn applied_migrations(pool: &DbPool) -> Result<Vec<AppliedMigration>, MigrateError> {
    let exists: bool =
        sqlx::query_scalar("SELECT to_regclass('public._sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await?;
    if !exists {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, description, success, installed_on
         FROM _sqlx_migrations
         ORDER BY version",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// List the up-migrations embedded in this build, oldest first.
pub fn available_migrations() -> Vec<AvailableMigration> {
    MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| AvailableMigration {
            version: m.version,
            description: m.description.to_string(),
            reversible: m.migration_type.is_reversible(),
        })
        .collect()
}
