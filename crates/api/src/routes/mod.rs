pub mod auth;
pub mod health;
pub mod organization;
pub mod projects;
pub mod runs;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                                   WebSocket gateway
///
/// /auth/register                        register (public)
/// /auth/login                           login (public)
/// /auth/refresh                         refresh (public)
/// /auth/logout                          logout
/// /auth/me                              current user
///
/// /organization                         get, update (admin)
///
/// /users                                list, create (admin)
/// /users/{id}                           get, update, delete (admin)
///
/// /projects                             list, create
/// /projects/{project_id}/...            see routes::projects
///
/// /activity                             organization feed
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/organization", organization::router())
        .nest("/users", users::router())
        .nest("/projects", projects::router())
        .route("/activity", get(handlers::activity::list_for_organization))
}
