//! Repository for the `test_suites` table.

use sqlx::PgPool;

use qualityhub_core::types::DbId;

use crate::models::test_suite::{CreateTestSuite, TestSuite, UpdateTestSuite};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, parent_suite_id, name, description, position, \
                       deleted_at, created_at, updated_at";

/// Provides CRUD operations for test suites within a project.
pub struct TestSuiteRepo;

impl TestSuiteRepo {
    /// Insert a new suite. `position` defaults to 0.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateTestSuite,
    ) -> Result<TestSuite, sqlx::Error> {
        let query = format!(
            "INSERT INTO test_suites (project_id, parent_suite_id, name, description, position)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TestSuite>(&query)
            .bind(project_id)
            .bind(input.parent_suite_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.position)
            .fetch_one(pool)
            .await
    }

    pub async fn find_in_project(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<TestSuite>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM test_suites
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, TestSuite>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List every live suite of a project in display order.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<TestSuite>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM test_suites
             WHERE project_id = $1 AND deleted_at IS NULL
             ORDER BY position ASC, name ASC"
        );
        sqlx::query_as::<_, TestSuite>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateTestSuite,
    ) -> Result<Option<TestSuite>, sqlx::Error> {
        let query = format!(
            "UPDATE test_suites SET
                parent_suite_id = COALESCE($3, parent_suite_id),
                name = COALESCE($4, name),
                description = COALESCE($5, description),
                position = COALESCE($6, position)
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TestSuite>(&query)
            .bind(id)
            .bind(project_id)
            .bind(input.parent_suite_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.position)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a suite. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE test_suites SET deleted_at = NOW()
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(project_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
