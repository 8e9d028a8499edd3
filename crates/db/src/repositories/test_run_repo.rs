//! Repository for the `test_runs` table.

use sqlx::PgPool;

use qualityhub_core::test_run::RunStatus;
use qualityhub_core::types::DbId;

use crate::models::test_run::{CreateTestRun, TestRun, UpdateTestRun};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, milestone_id, name, description, status, assigned_to, \
                       created_by, started_at, completed_at, deleted_at, created_at, updated_at";

/// Provides CRUD and lifecycle updates for test runs.
pub struct TestRunRepo;

impl TestRunRepo {
    /// Insert a new run in the `pending` state.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        created_by: Option<DbId>,
        input: &CreateTestRun,
    ) -> Result<TestRun, sqlx::Error> {
        let query = format!(
            "INSERT INTO test_runs (project_id, milestone_id, name, description, assigned_to, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TestRun>(&query)
            .bind(project_id)
            .bind(input.milestone_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.assigned_to)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_in_project(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<TestRun>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM test_runs
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, TestRun>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a live run whose live project belongs to `organization_id`.
    pub async fn find_in_org(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<TestRun>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM test_runs r
             JOIN projects p ON p.id = r.project_id
             WHERE r.id = $1
               AND p.organization_id = $2
               AND r.deleted_at IS NULL
               AND p.deleted_at IS NULL",
            qualified("r")
        );
        sqlx::query_as::<_, TestRun>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's runs, newest first, optionally filtered by status.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TestRun>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM test_runs
             WHERE project_id = $1 AND deleted_at IS NULL
               AND ($2::text IS NULL OR status = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, TestRun>(&query)
            .bind(project_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_project(
        pool: &PgPool,
        project_id: DbId,
        status: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM test_runs
             WHERE project_id = $1 AND deleted_at IS NULL
               AND ($2::text IS NULL OR status = $2)",
        )
        .bind(project_id)
        .bind(status)
        .fetch_one(pool)
        .await
    }

    /// Patch a run. `milestone_id` and `assigned_to` change only when the
    /// outer `Option` is `Some`, which lets a patch clear them.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateTestRun,
    ) -> Result<Option<TestRun>, sqlx::Error> {
        let query = format!(
            "UPDATE test_runs SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                milestone_id = CASE WHEN $5 THEN $6 ELSE milestone_id END,
                assigned_to = CASE WHEN $7 THEN $8 ELSE assigned_to END
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TestRun>(&query)
            .bind(id)
            .bind(project_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.milestone_id.is_some())
            .bind(input.milestone_id.flatten())
            .bind(input.assigned_to.is_some())
            .bind(input.assigned_to.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Move a run from `from` to `to`, stamping `started_at` / `completed_at`.
    ///
    /// The update only applies while the row is still in `from`, so two
    /// concurrent transitions cannot both succeed. Returns `None` when the
    /// row was not in the expected state.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: RunStatus,
        to: RunStatus,
    ) -> Result<Option<TestRun>, sqlx::Error> {
        let query = format!(
            "UPDATE test_runs SET
                status = $3::text,
                started_at = CASE WHEN $3::text = 'in_progress'
                                  THEN COALESCE(started_at, NOW()) ELSE started_at END,
                completed_at = CASE WHEN $3::text IN ('completed', 'aborted')
                                    THEN NOW() ELSE completed_at END
             WHERE id = $1 AND status = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TestRun>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(pool)
            .await
    }

    pub async fn soft_delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE test_runs SET deleted_at = NOW()
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(project_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// `COLUMNS` with every name prefixed by `alias.`.
fn qualified(alias: &str) -> String {
    COLUMNS
        .split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
