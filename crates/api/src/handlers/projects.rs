//! Handlers for the `/projects` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use qualityhub_core::error::CoreError;
use qualityhub_core::types::DbId;
use qualityhub_db::models::project::{CreateProject, Project, UpdateProject};
use qualityhub_db::repositories::ProjectRepo;
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::scope::{ensure_project, not_found, record, Activity};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::query::PaginationParams;
use crate::response::{created, ok, ApiResponse, Deleted, Page};
use crate::state::AppState;

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Page<Project>>>> {
    let (limit, offset) = params.resolve();
    let items = ProjectRepo::list_by_org(&state.pool, user.organization_id, limit, offset).await?;
    let total = ProjectRepo::count_by_org(&state.pool, user.organization_id).await?;
    Ok(ok(Page {
        items,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    AppJson(input): AppJson<CreateProject>,
) -> AppResult<(StatusCode, Json<ApiResponse<Project>>)> {
    input.validate()?;
    let project =
        ProjectRepo::create(&state.pool, user.organization_id, Some(user.user_id), &input).await?;

    record(
        &state,
        &user,
        Activity::new("created", "project", project.id)
            .in_project(project.id)
            .details(json!({ "name": project.name })),
    )
    .await;
    Ok(created(project))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Project>>> {
    Ok(ok(ensure_project(&state.pool, id, user.organization_id).await?))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateProject>,
) -> AppResult<Json<ApiResponse<Project>>> {
    input.validate()?;
    ensure_project(&state.pool, id, user.organization_id).await?;
    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("Project", id))?;

    record(
        &state,
        &user,
        Activity::new("updated", "project", id).in_project(id),
    )
    .await;
    Ok(ok(project))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    ensure_project(&state.pool, id, user.organization_id).await?;
    if !ProjectRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found("Project", id));
    }

    // Org-level feed entry: the project room is about to go quiet.
    record(&state, &user, Activity::new("deleted", "project", id)).await;
    Ok(ok(Deleted::new(id)))
}

/// POST /api/v1/projects/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Project>>> {
    let existing =
        ProjectRepo::find_in_org_include_deleted(&state.pool, id, user.organization_id)
            .await?
            .ok_or_else(|| not_found("Project", id))?;
    if existing.deleted_at.is_none() {
        return Err(AppError::Core(CoreError::Conflict(
            "Project is not deleted".into(),
        )));
    }

    ProjectRepo::restore(&state.pool, id).await?;
    let project = ensure_project(&state.pool, id, user.organization_id).await?;

    record(
        &state,
        &user,
        Activity::new("restored", "project", id).in_project(id),
    )
    .await;
    Ok(ok(project))
}
