//! Handlers for `/projects/{project_id}/runs`: CRUD, lifecycle, and results.
//!
//! Lifecycle changes and recorded results are published on the event bus;
//! the notification router fans them out to `project:` and `test-run:` rooms.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use qualityhub_core::error::CoreError;
use qualityhub_core::event_names::{
    NOTIFICATION, TEST_RESULT_ADDED, TEST_RUN_COMPLETED, TEST_RUN_STARTED, TEST_RUN_UPDATED,
};
use qualityhub_core::test_run::{ResultStatus, RunStatus, RunSummary};
use qualityhub_core::types::DbId;
use qualityhub_db::models::test_result::{CreateTestResult, TestResult};
use qualityhub_db::models::test_run::{CreateTestRun, TestRun, UpdateTestRun};
use qualityhub_db::repositories::{
    MilestoneRepo, TestCaseRepo, TestResultRepo, TestRunRepo, UserRepo,
};
use qualityhub_events::PlatformEvent;
use serde::Serialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::scope::{ensure_project, not_found, record, Activity};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireTester;
use crate::query::{PaginationParams, RunListParams};
use crate::response::{created, ok, ApiResponse, Deleted, Page};
use crate::state::AppState;

/// A run together with its aggregated results.
#[derive(Debug, Serialize)]
pub struct RunWithSummary {
    #[serde(flatten)]
    pub run: TestRun,
    pub summary: RunSummary,
}

/// Response of `POST .../results`.
#[derive(Debug, Serialize)]
pub struct RecordedResult {
    pub result: TestResult,
    pub summary: RunSummary,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn run_event(name: &str, user: &AuthUser, run: &TestRun, payload: Value) -> PlatformEvent {
    PlatformEvent::new(name)
        .with_organization(user.organization_id)
        .with_project(run.project_id)
        .with_test_run(run.id)
        .with_actor(user.user_id)
        .with_payload(payload)
}

/// Tell the assignee about their new run.
fn notify_assignee(state: &AppState, user: &AuthUser, run: &TestRun) {
    let Some(assignee) = run.assigned_to else {
        return;
    };
    tracing::debug!(test_run_id = %run.id, assignee = %assignee, "Notifying run assignee");
    state.publish(
        PlatformEvent::new(NOTIFICATION)
            .with_organization(user.organization_id)
            .with_project(run.project_id)
            .with_test_run(run.id)
            .with_actor(user.user_id)
            .with_recipient(assignee)
            .with_payload(json!({
                "kind": "test_run_assigned",
                "message": format!("You were assigned to test run '{}'", run.name),
                "test_run_id": run.id,
                "project_id": run.project_id,
                "assigned_by": user.user_id,
            })),
    );
}

/// Milestone and assignee must belong to the same project / organization.
async fn check_refs(
    state: &AppState,
    user: &AuthUser,
    project_id: DbId,
    milestone_id: Option<DbId>,
    assigned_to: Option<DbId>,
) -> AppResult<()> {
    if let Some(milestone_id) = milestone_id {
        if MilestoneRepo::find_in_project(&state.pool, project_id, milestone_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Milestone {milestone_id} does not exist in this project"
            ))));
        }
    }
    if let Some(assignee) = assigned_to {
        if UserRepo::find_in_org(&state.pool, assignee, user.organization_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "User {assignee} is not a member of this organization"
            ))));
        }
    }
    Ok(())
}

async fn find_run(state: &AppState, project_id: DbId, id: DbId) -> AppResult<TestRun> {
    TestRunRepo::find_in_project(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found("TestRun", id))
}

/// Apply a lifecycle transition and announce it.
///
/// The status rules live in [`RunStatus::transition_to`]; a concurrent change
/// to the run is reported as a conflict.
async fn apply_transition(
    state: &AppState,
    user: &AuthUser,
    run: &TestRun,
    to: RunStatus,
) -> AppResult<TestRun> {
    try_transition(state, user, run, to).await?.ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "Test run {} changed state concurrently",
            run.id
        )))
    })
}

/// Like [`apply_transition`], but yields `None` when another request moved
/// the run out of its current status first.
///
/// The repository update is guarded on the status read in `run`, so only one
/// of several racing transitions succeeds and announces itself.
async fn try_transition(
    state: &AppState,
    user: &AuthUser,
    run: &TestRun,
    to: RunStatus,
) -> AppResult<Option<TestRun>> {
    let from = run.run_status()?;
    from.transition_to(to)?;

    let Some(updated) = TestRunRepo::transition(&state.pool, run.id, from, to).await? else {
        tracing::debug!(test_run_id = %run.id, %from, to = %to, "Lost test run transition race");
        return Ok(None);
    };

    let event = match to {
        RunStatus::InProgress => {
            run_event(TEST_RUN_STARTED, user, &updated, json!({ "run": updated }))
        }
        _ => {
            let summary = TestResultRepo::summary(&state.pool, updated.id).await?;
            run_event(
                TEST_RUN_COMPLETED,
                user,
                &updated,
                json!({ "run": updated, "summary": summary }),
            )
        }
    };
    state.publish(event);

    let action = match to {
        RunStatus::InProgress => "started",
        RunStatus::Completed => "completed",
        RunStatus::Aborted => "aborted",
        RunStatus::Pending => "reset",
    };
    tracing::info!(test_run_id = %updated.id, %from, to = %to, "Test run transitioned");
    record(
        state,
        user,
        Activity::new(action, "test_run", updated.id)
            .in_project(updated.project_id)
            .details(json!({ "from": from.as_str(), "to": to.as_str() })),
    )
    .await;
    Ok(Some(updated))
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{project_id}/runs
///
/// Optional `status` filter.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<DbId>,
    AppQuery(params): AppQuery<RunListParams>,
) -> AppResult<Json<ApiResponse<Page<TestRun>>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    if let Some(status) = &params.status {
        status.parse::<RunStatus>()?;
    }
    let (limit, offset) = params.resolve();
    let status = params.status.as_deref();
    let items =
        TestRunRepo::list_by_project(&state.pool, project_id, status, limit, offset).await?;
    let total = TestRunRepo::count_by_project(&state.pool, project_id, status).await?;
    Ok(ok(Page {
        items,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/projects/{project_id}/runs
pub async fn create(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath(project_id): AppPath<DbId>,
    AppJson(input): AppJson<CreateTestRun>,
) -> AppResult<(StatusCode, Json<ApiResponse<TestRun>>)> {
    input.validate()?;
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    check_refs(&state, &user, project_id, input.milestone_id, input.assigned_to).await?;

    let run = TestRunRepo::create(&state.pool, project_id, Some(user.user_id), &input).await?;
    record(
        &state,
        &user,
        Activity::new("created", "test_run", run.id)
            .in_project(project_id)
            .details(json!({ "name": run.name })),
    )
    .await;
    notify_assignee(&state, &user, &run);
    Ok(created(run))
}

/// GET /api/v1/projects/{project_id}/runs/{id}
///
/// Includes the current result summary.
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<RunWithSummary>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    let run = find_run(&state, project_id, id).await?;
    let summary = TestResultRepo::summary(&state.pool, id).await?;
    Ok(ok(RunWithSummary { run, summary }))
}

/// PUT /api/v1/projects/{project_id}/runs/{id}
///
/// Status is not editable here; use the lifecycle endpoints. An explicit
/// `null` clears `milestone_id` or `assigned_to`.
pub async fn update(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<UpdateTestRun>,
) -> AppResult<Json<ApiResponse<TestRun>>> {
    input.validate()?;
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    check_refs(
        &state,
        &user,
        project_id,
        input.milestone_id.flatten(),
        input.assigned_to.flatten(),
    )
    .await?;

    let previous = find_run(&state, project_id, id).await?;
    let run = TestRunRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or_else(|| not_found("TestRun", id))?;

    state.publish(run_event(TEST_RUN_UPDATED, &user, &run, json!({ "run": run })));
    if run.assigned_to.is_some() && run.assigned_to != previous.assigned_to {
        notify_assignee(&state, &user, &run);
    }
    record(
        &state,
        &user,
        Activity::new("updated", "test_run", id).in_project(project_id),
    )
    .await;
    Ok(ok(run))
}

/// DELETE /api/v1/projects/{project_id}/runs/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    if !TestRunRepo::soft_delete(&state.pool, project_id, id).await? {
        return Err(not_found("TestRun", id));
    }
    record(
        &state,
        &user,
        Activity::new("deleted", "test_run", id).in_project(project_id),
    )
    .await;
    Ok(ok(Deleted::new(id)))
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{project_id}/runs/{id}/start
pub async fn start(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<TestRun>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    let run = find_run(&state, project_id, id).await?;
    Ok(ok(apply_transition(&state, &user, &run, RunStatus::InProgress).await?))
}

/// POST /api/v1/projects/{project_id}/runs/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<TestRun>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    let run = find_run(&state, project_id, id).await?;
    Ok(ok(apply_transition(&state, &user, &run, RunStatus::Completed).await?))
}

/// POST /api/v1/projects/{project_id}/runs/{id}/abort
pub async fn abort(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ApiResponse<TestRun>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    let run = find_run(&state, project_id, id).await?;
    Ok(ok(apply_transition(&state, &user, &run, RunStatus::Aborted).await?))
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{project_id}/runs/{id}/results
pub async fn list_results(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Page<TestResult>>>> {
    ensure_project(&state.pool, project_id, user.organization_id).await?;
    find_run(&state, project_id, id).await?;
    let (limit, offset) = params.resolve();
    let items = TestResultRepo::list_by_run(&state.pool, id, limit, offset).await?;
    let total = TestResultRepo::count_by_run(&state.pool, id).await?;
    Ok(ok(Page {
        items,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/projects/{project_id}/runs/{id}/results
///
/// Recording against a `pending` run starts it first. Results only land while
/// the run is `in_progress`; a run completed or aborted mid-request is a 409.
pub async fn record_result(
    State(state): State<AppState>,
    RequireTester(user): RequireTester,
    AppPath((project_id, id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<CreateTestResult>,
) -> AppResult<(StatusCode, Json<ApiResponse<RecordedResult>>)> {
    input.validate()?;
    let status: ResultStatus = input.status.parse()?;
    ensure_project(&state.pool, project_id, user.organization_id).await?;

    let mut run = find_run(&state, project_id, id).await?;
    let current = run.run_status()?;
    if !current.accepts_results() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Cannot record results on a {current} run"
        ))));
    }
    TestCaseRepo::find_in_project(&state.pool, project_id, input.test_case_id)
        .await?
        .ok_or_else(|| not_found("TestCase", input.test_case_id))?;

    if current == RunStatus::Pending {
        run = match try_transition(&state, &user, &run, RunStatus::InProgress).await? {
            Some(started) => started,
            // Someone else moved it first; the insert below re-checks the status.
            None => find_run(&state, project_id, id).await?,
        };
    }

    let result = TestResultRepo::create(&state.pool, run.id, Some(user.user_id), &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Test run {} is no longer accepting results",
                run.id
            )))
        })?;
    let summary = TestResultRepo::summary(&state.pool, run.id).await?;

    state.publish(run_event(
        TEST_RESULT_ADDED,
        &user,
        &run,
        json!({ "result": result, "summary": summary }),
    ));
    record(
        &state,
        &user,
        Activity::new("result_recorded", "test_result", result.id)
            .in_project(project_id)
            .details(json!({
                "test_run_id": run.id,
                "test_case_id": result.test_case_id,
                "status": status.as_str(),
            })),
    )
    .await;

    Ok(created(RecordedResult { result, summary }))
}
