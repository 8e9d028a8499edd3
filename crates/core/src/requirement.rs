//! Requirement status vocabulary and traceability coverage.

use serde::Serialize;

use crate::error::CoreError;
use crate::test_run::percentage;

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_DEPRECATED: &str = "deprecated";

pub const STATUSES: &[&str] = &[STATUS_DRAFT, STATUS_APPROVED, STATUS_DEPRECATED];

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid requirement status '{status}'. Must be one of: {}",
            STATUSES.join(", ")
        )))
    }
}

/// Project-level requirement coverage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coverage {
    pub total: i64,
    pub covered: i64,
    pub uncovered: i64,
    pub coverage_percent: f64,
}

impl Coverage {
    pub fn new(total: i64, covered: i64) -> Self {
        let covered = covered.clamp(0, total.max(0));
        Self {
            total,
            covered,
            uncovered: total - covered,
            coverage_percent: percentage(covered, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_requirements_means_zero_coverage() {
        let c = Coverage::new(0, 0);
        assert_eq!(c.coverage_percent, 0.0);
        assert_eq!(c.uncovered, 0);
    }

    #[test]
    fn partial_coverage() {
        let c = Coverage::new(8, 3);
        assert_eq!(c.uncovered, 5);
        assert_eq!(c.coverage_percent, 37.5);
    }

    #[test]
    fn status_validation() {
        assert!(validate_status(STATUS_APPROVED).is_ok());
        assert!(validate_status("final").is_err());
    }
}
