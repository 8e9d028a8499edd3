//! Handlers for `/projects/{project_id}/suites`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use qualityhub_core::error::CoreError;
use qualityhub_core::types::DbId;
use qualityhub_db::models::test_suite::{CreateTestSuite, TestSuite, UpdateTestSuite};
use qualityhub_db::repositories::TestSuiteRepo;
use qualityhub_db::DbPool;
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::scope::{ensure_project, not_found, record, Activity};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireTester;
use crate::query::PaginationParams;
use crate::response::{created, ok, ApiResponse, Deleted, Page};
use crate::state::AppState;

/// A parent suite must be a live suite of the same project.
async fn check_parent(pool: &DbPool, project_id: DbId, parent: Option<DbId>) -> AppResult<()> {
    if let Some(parent_id) = parent {
        if TestSuiteRepo::find_in_project(pool, project_id, parent_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Parent suite {parent_id} does not exist in this project"
            ))));
        }
    }
    Ok(())
}

/// GET /api/v1/projects/{project_id}/suites
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<DbId>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Page<TestSuite>>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    let (limit, offset) = params.resolve();
    let suites = TestSuiteRepo::list_by_project(&state.pool, project_id).await?;
    Ok(ok(Page::slice(suites, limit, offset)))
}

/// POST /api/v1/projects/{project_id}/suites
pub async fn create(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath(project_id): AppPath<DbId>,
    AppJson(input): AppJson<CreateTestSuite>,
) -> AppResult<(StatusCode, Json<ApiResponse<TestSuite>>)> {
    input.validate()?;
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    check_parent(&state.pool, project_id, input.parent_suite_id).await?;

    let suite = TestSuiteRepo::create(&state.pool, project_id, &input).await?;
    record(
        &state,
        &user,
        Activity::new("created", "test_suite", suite.id)
            .in_project(project_id)
            .details(json!({ "name": suite.name })),
    )
    .await;
    Ok(created(suite))
}

/// GET /api/v1/projects/{project_id}/suites/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<TestSuite>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    let suite = TestSuiteRepo::find_in_project(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("TestSuite", id))?;
    Ok(ok(suite))
}

/// PUT /api/v1/projects/{project_id}/suites/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<UpdateTestSuite>,
) -> AppResult<Json<ApiResponse<TestSuite>>> {
    input.validate()?;
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    if input.parent_suite_id == Some(id) {
        return Err(AppError::Core(CoreError::Validation(
            "A suite cannot be its own parent".into(),
        )));
    }
    check_parent(&state.pool, project_id, input.parent_suite_id).await?;

    let suite = TestSuiteRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or_else(|| not_found("TestSuite", id))?;
    record(
        &state,
        &user,
        Activity::new("updated", "test_suite", id).in_project(project_id),
    )
    .await;
    Ok(ok(suite))
}

/// DELETE /api/v1/projects/{project_id}/suites/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    if !TestSuiteRepo::soft_delete(&state.pool, project_id, id).await? {
        return Err(not_found("TestSuite", id));
    }
    record(
        &state,
        &user,
        Activity::new("deleted", "test_suite", id).in_project(project_id),
    )
    .await;
    Ok(ok(Deleted::new(id)))
}
