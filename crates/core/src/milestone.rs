//! Milestone status vocabulary and completion timestamp rule.

use crate::error::CoreError;
use crate::types::Timestamp;

pub const STATUS_PLANNED: &str = "planned";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_COMPLETED: &str = "completed";

pub const STATUSES: &[&str] = &[STATUS_PLANNED, STATUS_ACTIVE, STATUS_COMPLETED];

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid milestone status '{status}'. Must be one of: {}",
            STATUSES.join(", ")
        )))
    }
}

/// Resolve `completed_at` after a status change.
///
/// Entering `completed` stamps `now` unless a timestamp is already present;
/// any other status clears it.
pub fn completed_at_for(
    status: &str,
    current: Option<Timestamp>,
    now: Timestamp,
) -> Option<Timestamp> {
    if status == STATUS_COMPLETED {
        Some(current.unwrap_or(now))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn completing_stamps_now() {
        let now = Utc::now();
        assert_eq!(completed_at_for(STATUS_COMPLETED, None, now), Some(now));
    }

    #[test]
    fn already_completed_keeps_original_stamp() {
        let now = Utc::now();
        let earlier = now - Duration::days(2);
        assert_eq!(
            completed_at_for(STATUS_COMPLETED, Some(earlier), now),
            Some(earlier)
        );
    }

    #[test]
    fn reopening_clears_stamp() {
        let now = Utc::now();
        assert_eq!(completed_at_for(STATUS_ACTIVE, Some(now), now), None);
    }

    #[test]
    fn unknown_status_rejected() {
        assert!(validate_status("done").is_err());
        assert!(validate_status(STATUS_PLANNED).is_ok());
    }
}
