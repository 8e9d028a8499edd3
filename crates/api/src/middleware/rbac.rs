//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects callers below a minimum
//! role in the `admin > manager > tester > viewer` hierarchy.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use qualityhub_core::error::CoreError;
use qualityhub_core::roles::{has_at_least, ROLE_ADMIN, ROLE_MANAGER, ROLE_TESTER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    minimum: &str,
    message: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !has_at_least(&user.role, minimum) {
        tracing::debug!(user_id = %user.user_id, role = %user.role, minimum, "Role check failed");
        return Err(AppError::Core(CoreError::Forbidden(message.into())));
    }
    Ok(user)
}

/// Organization and user management.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_ADMIN, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Project management: `manager` or `admin`.
pub struct RequireManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_MANAGER, "Manager role or higher required")
            .await
            .map(RequireManager)
    }
}

/// Writing test data: anyone but `viewer`.
pub struct RequireTester(pub AuthUser);

impl FromRequestParts<AppState> for RequireTester {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_TESTER, "Tester role or higher required")
            .await
            .map(RequireTester)
    }
}

/// Any authenticated user. Same as [`AuthUser`], named for route readability.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
