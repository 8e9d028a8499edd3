//! Handlers for the caller's `/organization`.

use axum::extract::State;
use axum::Json;
use qualityhub_db::models::organization::{Organization, UpdateOrganization};
use qualityhub_db::repositories::OrganizationRepo;
use serde_json::json;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::handlers::scope::{not_found, record, Activity};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{ok, ApiResponse};
use crate::state::AppState;

/// GET /api/v1/organization
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Organization>>> {
    let org = OrganizationRepo::find_by_id(&state.pool, user.organization_id)
        .await?
        .ok_or_else(|| not_found("Organization", user.organization_id))?;
    Ok(ok(org))
}

/// PUT /api/v1/organization
///
/// The slug is fixed at registration; only the display name changes.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    AppJson(input): AppJson<UpdateOrganization>,
) -> AppResult<Json<ApiResponse<Organization>>> {
    input.validate()?;
    let org = OrganizationRepo::update(&state.pool, user.organization_id, &input)
        .await?
        .ok_or_else(|| not_found("Organization", user.organization_id))?;

    record(
        &state,
        &user,
        Activity::new("updated", "organization", org.id).details(json!({ "name": org.name })),
    )
    .await;
    Ok(ok(org))
}
