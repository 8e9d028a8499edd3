//! Activity log model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use qualityhub_core::types::{DbId, Timestamp};

/// An append-only activity row from the `activity_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityLog {
    pub id: DbId,
    pub organization_id: DbId,
    pub project_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub details: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting an activity entry.
#[derive(Debug, Clone)]
pub struct CreateActivityLog {
    pub organization_id: DbId,
    pub project_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub details: serde_json::Value,
}
