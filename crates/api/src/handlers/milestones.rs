//! Handlers for `/projects/{project_id}/milestones`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use qualityhub_core::milestone::{completed_at_for, validate_status, STATUS_PLANNED};
use qualityhub_core::types::DbId;
use qualityhub_db::models::milestone::{CreateMilestone, Milestone, UpdateMilestone};
use qualityhub_db::repositories::MilestoneRepo;
use serde_json::json;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::scope::{ensure_project, not_found, record, Activity};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireTester;
use crate::query::PaginationParams;
use crate::response::{created, ok, ApiResponse, Deleted, Page};
use crate::state::AppState;

/// GET /api/v1/projects/{project_id}/milestones
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<DbId>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Page<Milestone>>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    let (limit, offset) = params.resolve();
    let milestones = MilestoneRepo::list_by_project(&state.pool, project_id).await?;
    Ok(ok(Page::slice(milestones, limit, offset)))
}

/// POST /api/v1/projects/{project_id}/milestones
pub async fn create(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath(project_id): AppPath<DbId>,
    AppJson(mut input): AppJson<CreateMilestone>,
) -> AppResult<(StatusCode, Json<ApiResponse<Milestone>>)> {
    input.validate()?;
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    let status = input
        .status
        .get_or_insert_with(|| STATUS_PLANNED.to_string())
        .clone();
    validate_status(&status)?;

    let completed_at = completed_at_for(&status, None, Utc::now());
    let milestone = MilestoneRepo::create(&state.pool, project_id, &input, completed_at).await?;
    record(
        &state,
        &user,
        Activity::new("created", "milestone", milestone.id)
            .in_project(project_id)
            .details(json!({ "name": milestone.name, "status": milestone.status })),
    )
    .await;
    Ok(created(milestone))
}

/// GET /api/v1/projects/{project_id}/milestones/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<Milestone>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    let milestone = MilestoneRepo::find_in_project(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Milestone", id))?;
    Ok(ok(milestone))
}

/// PUT /api/v1/projects/{project_id}/milestones/{id}
///
/// `completed_at` follows the resulting status.
pub async fn update(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<UpdateMilestone>,
) -> AppResult<Json<ApiResponse<Milestone>>> {
    input.validate()?;
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    if let Some(status) = &input.status {
        validate_status(status)?;
    }

    let existing = MilestoneRepo::find_in_project(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Milestone", id))?;
    let status = input.status.as_deref().unwrap_or(&existing.status);
    let completed_at = completed_at_for(status, existing.completed_at, Utc::now());

    let milestone = MilestoneRepo::update(&state.pool, project_id, id, &input, completed_at)
        .await?
        .ok_or_else(|| not_found("Milestone", id))?;
    record(
        &state,
        &user,
        Activity::new("updated", "milestone", id)
            .in_project(project_id)
            .details(json!({ "status": milestone.status })),
    )
    .await;
    Ok(ok(milestone))
}

/// DELETE /api/v1/projects/{project_id}/milestones/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    if !MilestoneRepo::soft_delete(&state.pool, project_id, id).await? {
        return Err(not_found("Milestone", id));
    }
    record(
        &state,
        &user,
        Activity::new("deleted", "milestone", id).in_project(project_id),
    )
    .await;
    Ok(ok(Deleted::new(id)))
}
