//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`]: the caller, decoded from a Bearer access token.
//! - [`rbac::RequireAdmin`], [`rbac::RequireManager`], [`rbac::RequireTester`]:
//!   minimum-role gates.
//! - [`rbac::RequireAuth`]: any authenticated user.

pub mod auth;
pub mod rbac;
