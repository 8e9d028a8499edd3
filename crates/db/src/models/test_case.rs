//! Test case entity model, DTOs, and list filter.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use qualityhub_core::test_case::TestStep;
use qualityhub_core::types::{DbId, Timestamp};

/// A test case row. `steps` is stored as a JSONB array.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TestCase {
    pub id: DbId,
    pub project_id: DbId,
    pub suite_id: Option<DbId>,
    pub title: String,
    pub preconditions: Option<String>,
    pub steps: Json<Vec<TestStep>>,
    pub expected_result: Option<String>,
    pub priority: String,
    pub case_type: String,
    pub created_by: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTestCase {
    pub suite_id: Option<DbId>,
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    pub preconditions: Option<String>,
    pub steps: Option<Vec<TestStep>>,
    pub expected_result: Option<String>,
    /// Defaults to `medium` if omitted.
    pub priority: Option<String>,
    /// Defaults to `functional` if omitted.
    pub case_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTestCase {
    pub suite_id: Option<DbId>,
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,
    pub preconditions: Option<String>,
    pub steps: Option<Vec<TestStep>>,
    pub expected_result: Option<String>,
    pub priority: Option<String>,
    pub case_type: Option<String>,
}

/// Optional filters for listing test cases within a project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestCaseFilter {
    pub suite_id: Option<DbId>,
    pub priority: Option<String>,
    pub case_type: Option<String>,
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
}
