use axum::routing::get;
use axum::Router;

use crate::handlers::organization;
use crate::state::AppState;

/// Routes mounted at `/organization`.
///
/// ```text
/// GET /  -> get
/// PUT /  -> update (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(organization::get).put(organization::update))
}
