//! Well-known role name constants and the role hierarchy.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20250110000002_create_users.up.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_TESTER: &str = "tester";
pub const ROLE_VIEWER: &str = "viewer";

/// Every valid role, highest privilege first.
pub const ALL_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MANAGER, ROLE_TESTER, ROLE_VIEWER];

/// Numeric rank of a role (higher means more privileged).
///
/// Returns `None` for unknown role names.
pub fn role_rank(role: &str) -> Option<u8> {
    match role {
        ROLE_ADMIN => Some(3),
        ROLE_MANAGER => Some(2),
        ROLE_TESTER => Some(1),
        ROLE_VIEWER => Some(0),
        _ => None,
    }
}

/// Whether `role` is at least as privileged as `minimum`.
///
/// Unknown roles never satisfy any requirement.
pub fn has_at_least(role: &str, minimum: &str) -> bool {
    match (role_rank(role), role_rank(minimum)) {
        (Some(have), Some(need)) => have >= need,
        _ => false,
    }
}

pub fn is_valid_role(role: &str) -> bool {
    role_rank(role).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_satisfies_every_requirement() {
        for role in ALL_ROLES {
            assert!(has_at_least(ROLE_ADMIN, role));
        }
    }

    #[test]
    fn viewer_only_satisfies_viewer() {
        assert!(has_at_least(ROLE_VIEWER, ROLE_VIEWER));
        assert!(!has_at_least(ROLE_VIEWER, ROLE_TESTER));
        assert!(!has_at_least(ROLE_VIEWER, ROLE_MANAGER));
    }

    #[test]
    fn tester_can_write_but_not_manage() {
        assert!(has_at_least(ROLE_TESTER, ROLE_TESTER));
        assert!(!has_at_least(ROLE_TESTER, ROLE_MANAGER));
    }

    #[test]
    fn unknown_roles_are_rejected() {
        assert!(!is_valid_role("superuser"));
        assert!(!has_at_least("superuser", ROLE_VIEWER));
        assert!(!has_at_least(ROLE_ADMIN, "superuser"));
    }
}
