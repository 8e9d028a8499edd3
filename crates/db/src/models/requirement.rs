//! Requirement entity model, DTOs, and traceability links.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use qualityhub_core::requirement::Coverage;
use qualityhub_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Requirement {
    pub id: DbId,
    pub project_id: DbId,
    pub external_ref: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRequirement {
    #[validate(length(min = 1, max = 100))]
    pub external_ref: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `draft` if omitted.
    pub status: Option<String>,
    /// Defaults to `medium` if omitted.
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRequirement {
    #[validate(length(min = 1, max = 100))]
    pub external_ref: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

/// A row of the `requirement_test_cases` link table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RequirementTestCase {
    pub id: DbId,
    pub requirement_id: DbId,
    pub test_case_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body of a link request.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkTestCase {
    pub test_case_id: DbId,
}

/// Coverage totals plus the requirements that still lack a linked case.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementCoverage {
    #[serde(flatten)]
    pub coverage: Coverage,
    pub uncovered_requirements: Vec<Requirement>,
}
