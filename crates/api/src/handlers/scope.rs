//! Tenant scoping and side-effect helpers shared by the resource handlers.

use qualityhub_core::error::CoreError;
use qualityhub_core::types::DbId;
use qualityhub_db::models::activity::CreateActivityLog;
use qualityhub_db::models::project::Project;
use qualityhub_db::repositories::ProjectRepo;
use qualityhub_db::DbPool;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

/// Resolve a live project inside the caller's organization.
///
/// Projects of other organizations are reported as missing, never as forbidden.
pub async fn ensure_project(
    pool: &DbPool,
    project_id: DbId,
    organization_id: DbId,
) -> AppResult<Project> {
    ProjectRepo::find_in_org(pool, project_id, organization_id)
        .await?
        .ok_or_else(|| not_found("Project", project_id))
}

/// One row for the activity feed.
pub struct Activity<'a> {
    pub project_id: Option<DbId>,
    pub action: &'a str,
    pub entity_type: &'a str,
    pub entity_id: Option<DbId>,
    pub details: Value,
}

impl<'a> Activity<'a> {
    pub fn new(action: &'a str, entity_type: &'a str, entity_id: DbId) -> Self {
        Self {
            project_id: None,
            action,
            entity_type,
            entity_id: Some(entity_id),
            details: Value::Object(Default::default()),
        }
    }

    pub fn in_project(mut self, project_id: DbId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// Record an activity row for `user`.
///
/// The mutation has already committed, so a failure here is logged rather
/// than surfaced to the client.
pub async fn record(state: &AppState, user: &AuthUser, activity: Activity<'_>) {
    let entry = CreateActivityLog {
        organization_id: user.organization_id,
        project_id: activity.project_id,
        user_id: Some(user.user_id),
        action: activity.action.to_string(),
        entity_type: activity.entity_type.to_string(),
        entity_id: activity.entity_id,
        details: activity.details,
    };
    if let Err(e) = state.activity.record(entry).await {
        tracing::warn!(
            error = %e,
            user_id = %user.user_id,
            action = activity.action,
            entity_type = activity.entity_type,
            "Failed to record activity"
        );
    }
}
