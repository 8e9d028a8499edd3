//! Route definitions for the `/projects` resource.
//!
//! Everything owned by a project is nested under `/projects/{project_id}/...`.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{activity, cases, milestones, projects, requirements, suites};
use crate::routes::runs;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                              -> list
/// POST   /                                              -> create
/// GET    /{project_id}                                  -> get_by_id
/// PUT    /{project_id}                                  -> update
/// DELETE /{project_id}                                  -> delete
/// POST   /{project_id}/restore                          -> restore
///
/// GET    /{project_id}/suites                           -> list, create
/// GET    /{project_id}/suites/{id}                      -> get, update, delete
/// GET    /{project_id}/cases                            -> list, create
/// GET    /{project_id}/cases/{id}                       -> get, update, delete
/// GET    /{project_id}/milestones                       -> list, create
/// GET    /{project_id}/milestones/{id}                  -> get, update, delete
/// GET    /{project_id}/requirements                     -> list, create
/// GET    /{project_id}/requirements/coverage            -> coverage
/// GET    /{project_id}/requirements/{id}                -> get, update, delete
/// GET    /{project_id}/requirements/{id}/test-cases     -> list, link
/// DELETE /{project_id}/requirements/{id}/test-cases/{case_id} -> unlink
/// *      /{project_id}/runs/...                         -> see routes::runs
/// GET    /{project_id}/activity                         -> project feed
/// ```
pub fn router() -> Router<AppState> {
    let suite_routes = Router::new()
        .route("/", get(suites::list).post(suites::create))
        .route(
            "/{id}",
            get(suites::get_by_id)
                .put(suites::update)
                .delete(suites::delete),
        );

    let case_routes = Router::new()
        .route("/", get(cases::list).post(cases::create))
        .route(
            "/{id}",
            get(cases::get_by_id).put(cases::update).delete(cases::delete),
        );

    let milestone_routes = Router::new()
        .route("/", get(milestones::list).post(milestones::create))
        .route(
            "/{id}",
            get(milestones::get_by_id)
                .put(milestones::update)
                .delete(milestones::delete),
        );

    let requirement_routes = Router::new()
        .route("/", get(requirements::list).post(requirements::create))
        .route("/coverage", get(requirements::coverage))
        .route(
            "/{id}",
            get(requirements::get_by_id)
                .put(requirements::update)
                .delete(requirements::delete),
        )
        .route(
            "/{id}/test-cases",
            get(requirements::list_test_cases).post(requirements::link_test_case),
        )
        .route(
            "/{id}/test-cases/{case_id}",
            delete(requirements::unlink_test_case),
        );

    Router::new()
        .route("/", get(projects::list).post(projects::create))
        .route(
            "/{project_id}",
            get(projects::get_by_id)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route("/{project_id}/restore", post(projects::restore))
        .route("/{project_id}/activity", get(activity::list_for_project))
        .nest("/{project_id}/suites", suite_routes)
        .nest("/{project_id}/cases", case_routes)
        .nest("/{project_id}/milestones", milestone_routes)
        .nest("/{project_id}/requirements", requirement_routes)
        .nest("/{project_id}/runs", runs::router())
}
