//! Test run entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use qualityhub_core::error::CoreError;
use qualityhub_core::test_run::RunStatus;
use qualityhub_core::types::{DbId, Timestamp};

/// A test run row from the `test_runs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TestRun {
    pub id: DbId,
    pub project_id: DbId,
    pub milestone_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub assigned_to: Option<DbId>,
    pub created_by: Option<DbId>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TestRun {
    /// Parse the stored status string.
    pub fn run_status(&self) -> Result<RunStatus, CoreError> {
        self.status.parse()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTestRun {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub milestone_id: Option<DbId>,
    pub assigned_to: Option<DbId>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTestRun {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    /// `null` detaches the run from its milestone.
    #[serde(default, deserialize_with = "super::nullable")]
    pub milestone_id: Option<Option<DbId>>,
    /// `null` unassigns the run.
    #[serde(default, deserialize_with = "super::nullable")]
    pub assigned_to: Option<Option<DbId>>,
}
