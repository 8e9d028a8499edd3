//! Test result entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use qualityhub_core::types::{DbId, Timestamp};

/// One recorded execution of a test case inside a run.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TestResult {
    pub id: DbId,
    pub test_run_id: DbId,
    pub test_case_id: DbId,
    pub status: String,
    pub comment: Option<String>,
    pub duration_ms: Option<i64>,
    pub executed_by: Option<DbId>,
    pub executed_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTestResult {
    pub test_case_id: DbId,
    pub status: String,
    #[validate(length(max = 10000))]
    pub comment: Option<String>,
    #[validate(range(min = 0))]
    pub duration_ms: Option<i64>,
}
