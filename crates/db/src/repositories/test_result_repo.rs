//! Repository for the `test_results` table.

use sqlx::PgPool;

use qualityhub_core::test_run::{ResultStatus, RunSummary};
use qualityhub_core::types::DbId;

use crate::models::test_result::{CreateTestResult, TestResult};

const COLUMNS: &str = "id, test_run_id, test_case_id, status, comment, duration_ms, \
                       executed_by, executed_at, created_at, updated_at";

/// Results are append-only: re-executing a case adds a new row.
/// Closed runs never gain results; see [`TestResultRepo::create`].
pub struct TestResultRepo;

impl TestResultRepo {
    /// Insert a result while the run is `in_progress`.
    ///
    /// The run row is share-locked for the insert, so a concurrent complete or
    /// abort either waits for this result or makes the insert see the new
    /// status. Returns `None` when the run is not accepting results.
    pub async fn create(
        pool: &PgPool,
        test_run_id: DbId,
        executed_by: Option<DbId>,
        input: &CreateTestResult,
    ) -> Result<Option<TestResult>, sqlx::Error> {
        let query = format!(
            "WITH open_run AS (
                 SELECT id FROM test_runs
                 WHERE id = $1 AND status = 'in_progress' AND deleted_at IS NULL
                 FOR SHARE
             )
             INSERT INTO test_results (test_run_id, test_case_id, status, comment, duration_ms, executed_by)
             SELECT open_run.id, $2, $3, $4, $5, $6 FROM open_run
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TestResult>(&query)
            .bind(test_run_id)
            .bind(input.test_case_id)
            .bind(&input.status)
            .bind(&input.comment)
            .bind(input.duration_ms)
            .bind(executed_by)
            .fetch_optional(pool)
            .await
    }

    /// Full result history of a run, newest first.
    pub async fn list_by_run(
        pool: &PgPool,
        test_run_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TestResult>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM test_results
             WHERE test_run_id = $1
             ORDER BY executed_at DESC, created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, TestResult>(&query)
            .bind(test_run_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_run(pool: &PgPool, test_run_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM test_results WHERE test_run_id = $1")
            .bind(test_run_id)
            .fetch_one(pool)
            .await
    }

    /// Aggregate the latest result of each case in a run.
    pub async fn summary(pool: &PgPool, test_run_id: DbId) -> Result<RunSummary, sqlx::Error> {
        let statuses: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT ON (test_case_id) status
             FROM test_results
             WHERE test_run_id = $1
             ORDER BY test_case_id, executed_at DESC, created_at DESC",
        )
        .bind(test_run_id)
        .fetch_all(pool)
        .await?;

        Ok(RunSummary::from_statuses(
            statuses
                .iter()
                .filter_map(|s| s.parse::<ResultStatus>().ok()),
        ))
    }
}
