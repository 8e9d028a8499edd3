//! Route definitions for test runs and their results.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::runs;
use crate::state::AppState;

/// Routes mounted at `/projects/{project_id}/runs`.
///
/// ```text
/// GET    /                -> list (?status, limit, offset)
/// POST   /                -> create
/// GET    /{id}            -> get_by_id
/// PUT    /{id}            -> update
/// DELETE /{id}            -> delete
/// POST   /{id}/start      -> start
/// POST   /{id}/complete   -> complete
/// POST   /{id}/abort      -> abort
/// GET    /{id}/results    -> list_results
/// POST   /{id}/results    -> record_result
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(runs::list).post(runs::create))
        .route(
            "/{id}",
            get(runs::get_by_id).put(runs::update).delete(runs::delete),
        )
        .route("/{id}/start", post(runs::start))
        .route("/{id}/complete", post(runs::complete))
        .route("/{id}/abort", post(runs::abort))
        .route(
            "/{id}/results",
            get(runs::list_results).post(runs::record_result),
        )
}
