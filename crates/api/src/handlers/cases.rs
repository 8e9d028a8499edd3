//! Handlers for `/projects/{project_id}/cases`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use qualityhub_core::error::CoreError;
use qualityhub_core::test_case::{validate_case_type, validate_priority, validate_steps};
use qualityhub_core::types::DbId;
use qualityhub_db::models::test_case::{CreateTestCase, TestCase, UpdateTestCase};
use qualityhub_db::repositories::{TestCaseRepo, TestSuiteRepo};
use qualityhub_db::DbPool;
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::scope::{ensure_project, not_found, record, Activity};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireTester;
use crate::query::CaseListParams;
use crate::response::{created, ok, ApiResponse, Deleted, Page};
use crate::state::AppState;

/// Enumerated fields, step count, and suite ownership.
async fn check_fields(
    pool: &DbPool,
    project_id: DbId,
    suite_id: Option<DbId>,
    priority: Option<&str>,
    case_type: Option<&str>,
    steps: Option<&[qualityhub_core::test_case::TestStep]>,
) -> AppResult<()> {
    if let Some(priority) = priority {
        validate_priority(priority)?;
    }
    if let Some(case_type) = case_type {
        validate_case_type(case_type)?;
    }
    if let Some(steps) = steps {
        validate_steps(steps)?;
    }
    if let Some(suite_id) = suite_id {
        if TestSuiteRepo::find_in_project(pool, project_id, suite_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Suite {suite_id} does not exist in this project"
            ))));
        }
    }
    Ok(())
}

/// GET /api/v1/projects/{project_id}/cases
///
/// Filters: `suite_id`, `priority`, `case_type`, `search` (title substring).
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<DbId>,
    AppQuery(params): AppQuery<CaseListParams>,
) -> AppResult<Json<ApiResponse<Page<TestCase>>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    let (limit, offset) = params.resolve();
    let filter = params.filter();
    let items = TestCaseRepo::list(&state.pool, project_id, &filter, limit, offset).await?;
    let total = TestCaseRepo::count(&state.pool, project_id, &filter).await?;
    Ok(ok(Page {
        items,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/projects/{project_id}/cases
pub async fn create(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath(project_id): AppPath<DbId>,
    AppJson(input): AppJson<CreateTestCase>,
) -> AppResult<(StatusCode, Json<ApiResponse<TestCase>>)> {
    input.validate()?;
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    check_fields(
        &state.pool,
        project_id,
        input.suite_id,
        input.priority.as_deref(),
        input.case_type.as_deref(),
        input.steps.as_deref(),
    )
    .await?;

    let case = TestCaseRepo::create(&state.pool, project_id, Some(user.user_id), &input).await?;
    record(
        &state,
        &user,
        Activity::new("created", "test_case", case.id)
            .in_project(project_id)
            .details(json!({ "title": case.title })),
    )
    .await;
    Ok(created(case))
}

/// GET /api/v1/projects/{project_id}/cases/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<TestCase>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    let case = TestCaseRepo::find_in_project(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("TestCase", id))?;
    Ok(ok(case))
}

/// PUT /api/v1/projects/{project_id}/cases/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<UpdateTestCase>,
) -> AppResult<Json<ApiResponse<TestCase>>> {
    input.validate()?;
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    check_fields(
        &state.pool,
        project_id,
        input.suite_id,
        input.priority.as_deref(),
        input.case_type.as_deref(),
        input.steps.as_deref(),
    )
    .await?;

    let case = TestCaseRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or_else(|| not_found("TestCase", id))?;
    record(
        &state,
        &user,
        Activity::new("updated", "test_case", id).in_project(project_id),
    )
    .await;
    Ok(ok(case))
}

/// DELETE /api/v1/projects/{project_id}/cases/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    if !TestCaseRepo::soft_delete(&state.pool, project_id, id).await? {
        return Err(not_found("TestCase", id));
    }
    record(
        &state,
        &user,
        Activity::new("deleted", "test_case", id).in_project(project_id),
    )
    .await;
    Ok(ok(Deleted::new(id)))
}
