//! Test suite entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use qualityhub_core::types::{DbId, Timestamp};

/// A test suite row. Suites nest through `parent_suite_id`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TestSuite {
    pub id: DbId,
    pub project_id: DbId,
    pub parent_suite_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub position: i32,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTestSuite {
    pub parent_suite_id: Option<DbId>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTestSuite {
    pub parent_suite_id: Option<DbId>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub position: Option<i32>,
}
