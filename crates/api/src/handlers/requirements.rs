//! Handlers for `/projects/{project_id}/requirements` and traceability links.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use qualityhub_core::requirement::validate_status;
use qualityhub_core::test_case::validate_priority;
use qualityhub_core::types::DbId;
use qualityhub_db::models::requirement::{
    CreateRequirement, LinkTestCase, Requirement, RequirementCoverage, RequirementTestCase,
    UpdateRequirement,
};
use qualityhub_db::models::test_case::TestCase;
use qualityhub_db::repositories::{RequirementRepo, TestCaseRepo};
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

fn check_enums(status: Option<&str>, priority: Option<&str>) -> AppResult<()> {
    if let Some(status) = status {
        validate_status(status)?;
    }
    if let Some(priority) = priority {
        validate_priority(priority)?;
    }
    Ok(())
}

/// GET /api/v1/projects/{project_id}/requirements
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<DbId>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Page<Requirement>>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    let (limit, offset) = params.resolve();
    let items = RequirementRepo::list_by_project(&state.pool, project_id, limit, offset).await?;
    let total = RequirementRepo::count_by_project(&state.pool, project_id).await?;
    Ok(ok(Page {
        items,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/projects/{project_id}/requirements
pub async fn create(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath(project_id): AppPath<DbId>,
    AppJson(input): AppJson<CreateRequirement>,
) -> AppResult<(StatusCode, Json<ApiResponse<Requirement>>)> {
    input.validate()?;
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    check_enums(input.status.as_deref(), input.priority.as_deref())?;

    let requirement = RequirementRepo::create(&state.pool, project_id, &input).await?;
    record(
        &state,
        &user,
        Activity::new("created", "requirement", requirement.id)
            .in_project(project_id)
            .details(json!({ "title": requirement.title })),
    )
    .await;
    Ok(created(requirement))
}

/// GET /api/v1/projects/{project_id}/requirements/coverage
pub async fn coverage(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<RequirementCoverage>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    Ok(ok(RequirementRepo::coverage(&state.pool, project_id).await?))
}

/// GET /api/v1/projects/{project_id}/requirements/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<Requirement>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    let requirement = RequirementRepo::find_in_project(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Requirement", id))?;
    Ok(ok(requirement))
}

/// PUT /api/v1/projects/{project_id}/requirements/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<UpdateRequirement>,
) -> AppResult<Json<ApiResponse<Requirement>>> {
    input.validate()?;
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    check_enums(input.status.as_deref(), input.priority.as_deref())?;

    let requirement = RequirementRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or_else(|| not_found("Requirement", id))?;
    record(
        &state,
        &user,
        Activity::new("updated", "requirement", id).in_project(project_id),
    )
    .await;
    Ok(ok(requirement))
}

/// DELETE /api/v1/projects/{project_id}/requirements/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    if !RequirementRepo::soft_delete(&state.pool, project_id, id).await? {
        return Err(not_found("Requirement", id));
    }
    record(
        &state,
        &user,
        Activity::new("deleted", "requirement", id).in_project(project_id),
    )
    .await;
    Ok(ok(Deleted::new(id)))
}

// ---------------------------------------------------------------------------
// Traceability links
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{project_id}/requirements/{id}/test-cases
pub async fn list_test_cases(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<Vec<TestCase>>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    RequirementRepo::find_in_project(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Requirement", id))?;
    Ok(ok(RequirementRepo::linked_test_cases(&state.pool, id).await?))
}

/// POST /api/v1/projects/{project_id}/requirements/{id}/test-cases
///
/// Linking the same pair twice is a 409 from `uq_requirement_test_cases_pair`.
pub async fn link_test_case(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<LinkTestCase>,
) -> AppResult<(StatusCode, Json<ApiResponse<RequirementTestCase>>)> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    RequirementRepo::find_in_project(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Requirement", id))?;
    TestCaseRepo::find_in_project(&state.pool, project_id, input.test_case_id)
        .await?
        .ok_or_else(|| not_found("TestCase", input.test_case_id))?;

    let link = RequirementRepo::link_test_case(&state.pool, id, input.test_case_id).await?;
    record(
        &state,
        &user,
        Activity::new("linked", "requirement", id)
            .in_project(project_id)
            .details(json!({ "test_case_id": input.test_case_id })),
    )
    .await;
    Ok(created(link))
}

/// DELETE /api/v1/projects/{project_id}/requirements/{id}/test-cases/{case_id}
pub async fn unlink_test_case(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id, case_id)): AppPath<(DbId, DbId, DbId)>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    RequirementRepo::find_in_project(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("Requirement", id))?;
    if !RequirementRepo::unlink_test_case(&state.pool, id, case_id).await? {
        return Err(not_found("RequirementTestCase", case_id));
    }
    record(
        &state,
        &user,
        Activity::new("unlinked", "requirement", id)
            .in_project(project_id)
            .details(json!({ "test_case_id": case_id })),
    )
    .await;
    Ok(ok(Deleted::new(case_id)))
}
