//! Read-only activity feeds.

use axum::extract::State;
use axum::Json;
use qualityhub_core::types::DbId;
use qualityhub_db::models::activity::ActivityLog;
use qualityhub_db::repositories::ActivityRepo;

use crate::error::AppResult;
use crate::extract::{AppPath, AppQuery};
use crate::handlers::scope::ensure_project;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{ok, ApiResponse, Page};
use crate::state::AppState;

/// GET /api/v1/activity
pub async fn list_for_organization(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Page<ActivityLog>>>> {
    let (limit, offset) = params.resolve();
    let items = ActivityRepo::list_by_org(&state.pool, user.organization_id, limit, offset).await?;
    let total = ActivityRepo::count_by_org(&state.pool, user.organization_id).await?;
    Ok(ok(Page {
        items,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/projects/{project_id}/activity
pub async fn list_for_project(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<DbId>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Page<ActivityLog>>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    let (limit, offset) = params.resolve();
    let items = ActivityRepo::list_by_project(&state.pool, project_id, limit, offset).await?;
    let total = ActivityRepo::count_by_project(&state.pool, project_id).await?;
    Ok(ok(Page {
        items,
        total,
        limit,
        offset,
    }))
}
