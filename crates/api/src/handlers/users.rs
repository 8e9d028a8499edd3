//! Handlers for the `/users` resource: members of the caller's organization.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use qualityhub_core::error::CoreError;
use qualityhub_core::roles::{is_valid_role, ALL_ROLES, ROLE_TESTER};
use qualityhub_core::types::DbId;
use qualityhub_db::models::user::{CreateUser, UpdateUser, UserResponse};
use qualityhub_db::repositories::{SessionRepo, UserRepo};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::auth::normalize_email;
use crate::handlers::scope::{not_found, record, Activity};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::{created, ok, ApiResponse, Deleted, Page};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub password: String,
    /// Defaults to `tester`.
    pub role: Option<String>,
}

fn check_role(role: &str) -> AppResult<()> {
    if is_valid_role(role) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {}",
            ALL_ROLES.join(", ")
        ))))
    }
}

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Page<UserResponse>>>> {
    let (limit, offset) = params.resolve();
    let users = UserRepo::list_by_org(&state.pool, user.organization_id, limit, offset).await?;
    let total = UserRepo::count_by_org(&state.pool, user.organization_id).await?;
    Ok(ok(Page {
        items: users.into_iter().map(UserResponse::from).collect(),
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    input.validate()?;
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let role = input.role.unwrap_or_else(|| ROLE_TESTER.to_string());
    check_role(&role)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            organization_id: admin.organization_id,
            email: normalize_email(&input.email),
            name: input.name.trim().to_string(),
            password_hash,
            role,
        },
    )
    .await?;

    record(
        &state,
        &admin,
        Activity::new("created", "user", user.id)
            .details(json!({ "email": user.email, "role": user.role })),
    )
    .await;
    Ok(created(UserResponse::from(user)))
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let found = UserRepo::find_in_org(&state.pool, id, user.organization_id)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    Ok(ok(UserResponse::from(found)))
}

/// PUT /api/v1/users/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    AppJson(mut input): AppJson<UpdateUser>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    if let Some(role) = &input.role {
        check_role(role)?;
    }
    if let Some(name) = &input.name {
        if name.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Invalid fields: name".into(),
            )));
        }
    }
    input.email = input.email.as_deref().map(normalize_email);

    let user = UserRepo::update(&state.pool, id, admin.organization_id, &input)
        .await?
        .ok_or_else(|| not_found("User", id))?;

    if input.is_active == Some(false) {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }

    record(
        &state,
        &admin,
        Activity::new("updated", "user", user.id).details(json!({ "role": user.role })),
    )
    .await;
    Ok(ok(UserResponse::from(user)))
}

/// DELETE /api/v1/users/{id}
///
/// Soft delete. Admins cannot delete themselves.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    if id == admin.user_id {
        return Err(AppError::BadRequest("You cannot delete your own account".into()));
    }
    if !UserRepo::soft_delete(&state.pool, id, admin.organization_id).await? {
        return Err(not_found("User", id));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    record(&state, &admin, Activity::new("deleted", "user", id)).await;
    Ok(ok(Deleted::new(id)))
}
