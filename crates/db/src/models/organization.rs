//! Organization (tenant) entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use qualityhub_core::types::{DbId, Timestamp};

/// An organization row from the `organizations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Organization {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new organization. The slug is derived by the caller.
#[derive(Debug, Clone)]
pub struct CreateOrganization {
    pub name: String,
    pub slug: String,
}

/// DTO for updating an organization.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateOrganization {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
}
