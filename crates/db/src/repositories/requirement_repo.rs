//! Repository for the `requirements` and `requirement_test_cases` tables.

use sqlx::PgPool;

use qualityhub_core::requirement::{Coverage, STATUS_DRAFT};
use qualityhub_core::test_case::DEFAULT_PRIORITY;
use qualityhub_core::types::DbId;

use crate::models::requirement::{
    CreateRequirement, Requirement, RequirementCoverage, RequirementTestCase, UpdateRequirement,
};
use crate::models::test_case::TestCase;

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

const COLUMNS: &str = "id, project_id, external_ref, title, description, status, priority, \
                       deleted_at, created_at, updated_at";

/// Same columns qualified with the `r` alias, for joins.
const R_COLUMNS: &str = "r.id, r.project_id, r.external_ref, r.title, r.description, r.status, \
                         r.priority, r.deleted_at, r.created_at, r.updated_at";

const TC_COLUMNS: &str = "tc.id, tc.project_id, tc.suite_id, tc.title, tc.preconditions, \
                          tc.steps, tc.expected_result, tc.priority, tc.case_type, \
                          tc.created_by, tc.deleted_at, tc.created_at, tc.updated_at";

const LINK_COLUMNS: &str = "id, requirement_id, test_case_id, created_at, updated_at";

/// A requirement counts as covered when it links to at least one live case.
const COVERED: &str = "EXISTS (
    SELECT 1 FROM requirement_test_cases rtc
    JOIN test_cases tc ON tc.id = rtc.test_case_id
    WHERE rtc.requirement_id = r.id AND tc.deleted_at IS NULL
)";

// ---------------------------------------------------------------------------
// RequirementRepo
// ---------------------------------------------------------------------------

pub struct RequirementRepo;

impl RequirementRepo {
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateRequirement,
    ) -> Result<Requirement, sqlx::Error> {
        let query = format!(
            "INSERT INTO requirements (project_id, external_ref, title, description, status, priority)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Requirement>(&query)
            .bind(project_id)
            .bind(&input.external_ref)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status.as_deref().unwrap_or(STATUS_DRAFT))
            .bind(input.priority.as_deref().unwrap_or(DEFAULT_PRIORITY))
            .fetch_one(pool)
            .await
    }

    pub async fn find_in_project(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Requirement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM requirements
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Requirement>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Requirement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM requirements
             WHERE project_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Requirement>(&query)
            .bind(project_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_project(pool: &PgPool, project_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM requirements WHERE project_id = $1 AND deleted_at IS NULL",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateRequirement,
    ) -> Result<Option<Requirement>, sqlx::Error> {
        let query = format!(
            "UPDATE requirements SET
                external_ref = COALESCE($3, external_ref),
                title = COALESCE($4, title),
                description = COALESCE($5, description),
                status = COALESCE($6, status),
                priority = COALESCE($7, priority)
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Requirement>(&query)
            .bind(id)
            .bind(project_id)
            .bind(&input.external_ref)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.priority)
            .fetch_optional(pool)
            .await
    }

    pub async fn soft_delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE requirements SET deleted_at = NOW()
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(project_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- traceability links --------------------------------------------------

    /// Link a test case to a requirement.
    ///
    /// A duplicate pair violates `uq_requirement_test_cases_pair`.
    pub async fn link_test_case(
        pool: &PgPool,
        requirement_id: DbId,
        test_case_id: DbId,
    ) -> Result<RequirementTestCase, sqlx::Error> {
        let query = format!(
            "INSERT INTO requirement_test_cases (requirement_id, test_case_id)
             VALUES ($1, $2)
             RETURNING {LINK_COLUMNS}"
        );
        sqlx::query_as::<_, RequirementTestCase>(&query)
            .bind(requirement_id)
            .bind(test_case_id)
            .fetch_one(pool)
            .await
    }

    /// Remove a link. Returns `true` if a row was deleted.
    pub async fn unlink_test_case(
        pool: &PgPool,
        requirement_id: DbId,
        test_case_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM requirement_test_cases WHERE requirement_id = $1 AND test_case_id = $2",
        )
        .bind(requirement_id)
        .bind(test_case_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Live test cases linked to a requirement.
    pub async fn linked_test_cases(
        pool: &PgPool,
        requirement_id: DbId,
    ) -> Result<Vec<TestCase>, sqlx::Error> {
        let query = format!(
            "SELECT {TC_COLUMNS}
             FROM requirement_test_cases rtc
             JOIN test_cases tc ON tc.id = rtc.test_case_id
             WHERE rtc.requirement_id = $1 AND tc.deleted_at IS NULL
             ORDER BY rtc.created_at ASC"
        );
        sqlx::query_as::<_, TestCase>(&query)
            .bind(requirement_id)
            .fetch_all(pool)
            .await
    }

    // -- coverage ------------------------------------------------------------

    /// Coverage totals and uncovered requirements for a project.
    pub async fn coverage(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<RequirementCoverage, sqlx::Error> {
        let counts_query = format!(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE {COVERED})
             FROM requirements r
             WHERE r.project_id = $1 AND r.deleted_at IS NULL"
        );
        let (total, covered): (i64, i64) = sqlx::query_as(&counts_query)
            .bind(project_id)
            .fetch_one(pool)
            .await?;

        let uncovered_query = format!(
            "SELECT {R_COLUMNS} FROM requirements r
             WHERE r.project_id = $1 AND r.deleted_at IS NULL AND NOT {COVERED}
             ORDER BY r.created_at ASC"
        );
        let uncovered_requirements = sqlx::query_as::<_, Requirement>(&uncovered_query)
            .bind(project_id)
            .fetch_all(pool)
            .await?;

        Ok(RequirementCoverage {
            coverage: Coverage::new(total, covered),
            uncovered_requirements,
        })
    }
}
