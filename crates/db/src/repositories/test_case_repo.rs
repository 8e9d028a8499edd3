//! Repository for the `test_cases` table.

use sqlx::types::Json;
use sqlx::PgPool;

use qualityhub_core::test_case::{DEFAULT_CASE_TYPE, DEFAULT_PRIORITY};
use qualityhub_core::types::DbId;

use crate::models::test_case::{CreateTestCase, TestCase, TestCaseFilter, UpdateTestCase};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, suite_id, title, preconditions, steps, expected_result, \
                       priority, case_type, created_by, deleted_at, created_at, updated_at";

/// Filter clause shared by `list` and `count`; parameters `$1..=$5`.
const FILTER: &str = "project_id = $1 AND deleted_at IS NULL
    AND ($2::uuid IS NULL OR suite_id = $2)
    AND ($3::text IS NULL OR priority = $3)
    AND ($4::text IS NULL OR case_type = $4)
    AND ($5::text IS NULL OR title ILIKE '%' || $5 || '%')";

/// Provides CRUD operations for test cases within a project.
pub struct TestCaseRepo;

impl TestCaseRepo {
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        created_by: Option<DbId>,
        input: &CreateTestCase,
    ) -> Result<TestCase, sqlx::Error> {
        let query = format!(
            "INSERT INTO test_cases
                (project_id, suite_id, title, preconditions, steps, expected_result,
                 priority, case_type, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let steps = Json(input.steps.clone().unwrap_or_default());
        sqlx::query_as::<_, TestCase>(&query)
            .bind(project_id)
            .bind(input.suite_id)
            .bind(&input.title)
            .bind(&input.preconditions)
            .bind(steps)
            .bind(&input.expected_result)
            .bind(input.priority.as_deref().unwrap_or(DEFAULT_PRIORITY))
            .bind(input.case_type.as_deref().unwrap_or(DEFAULT_CASE_TYPE))
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_in_project(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<TestCase>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM test_cases
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, TestCase>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List cases matching `filter`, most recently created first.
    pub async fn list(
        pool: &PgPool,
        project_id: DbId,
        filter: &TestCaseFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TestCase>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM test_cases
             WHERE {FILTER}
             ORDER BY created_at DESC
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, TestCase>(&query)
            .bind(project_id)
            .bind(filter.suite_id)
            .bind(&filter.priority)
            .bind(&filter.case_type)
            .bind(&filter.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(
        pool: &PgPool,
        project_id: DbId,
        filter: &TestCaseFilter,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM test_cases WHERE {FILTER}");
        sqlx::query_scalar(&query)
            .bind(project_id)
            .bind(filter.suite_id)
            .bind(&filter.priority)
            .bind(&filter.case_type)
            .bind(&filter.search)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateTestCase,
    ) -> Result<Option<TestCase>, sqlx::Error> {
        let query = format!(
            "UPDATE test_cases SET
                suite_id = COALESCE($3, suite_id),
                title = COALESCE($4, title),
                preconditions = COALESCE($5, preconditions),
                steps = COALESCE($6, steps),
                expected_result = COALESCE($7, expected_result),
                priority = COALESCE($8, priority),
                case_type = COALESCE($9, case_type)
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TestCase>(&query)
            .bind(id)
            .bind(project_id)
            .bind(input.suite_id)
            .bind(&input.title)
            .bind(&input.preconditions)
            .bind(input.steps.clone().map(Json))
            .bind(&input.expected_result)
            .bind(&input.priority)
            .bind(&input.case_type)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a case. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE test_cases SET deleted_at = NOW()
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(project_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
