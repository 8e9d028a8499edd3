//! Test case vocabulary: priorities, types, and structured steps.
//!
//! Values must match the `CHECK` constraints on `test_cases.priority` and
//! `test_cases.case_type`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const PRIORITY_CRITICAL: &str = "critical";
pub const PRIORITY_HIGH: &str = "high";
pub const PRIORITY_MEDIUM: &str = "medium";
pub const PRIORITY_LOW: &str = "low";

pub const PRIORITIES: &[&str] = &[
    PRIORITY_CRITICAL,
    PRIORITY_HIGH,
    PRIORITY_MEDIUM,
    PRIORITY_LOW,
];

/// Priority assigned when a create request omits one.
pub const DEFAULT_PRIORITY: &str = PRIORITY_MEDIUM;

pub const CASE_TYPES: &[&str] = &[
    "functional",
    "regression",
    "smoke",
    "integration",
    "performance",
    "security",
    "usability",
    "other",
];

pub const DEFAULT_CASE_TYPE: &str = "functional";

/// Maximum number of steps a single test case may carry.
pub const MAX_STEPS: usize = 200;

/// One numbered step of a manual test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    pub action: String,
    #[serde(default)]
    pub expected_result: Option<String>,
}

pub fn validate_priority(priority: &str) -> Result<(), CoreError> {
    if PRIORITIES.contains(&priority) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid priority '{priority}'. Must be one of: {}",
            PRIORITIES.join(", ")
        )))
    }
}

pub fn validate_case_type(case_type: &str) -> Result<(), CoreError> {
    if CASE_TYPES.contains(&case_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid case type '{case_type}'. Must be one of: {}",
            CASE_TYPES.join(", ")
        )))
    }
}

/// Reject step lists that are too long or contain blank actions.
pub fn validate_steps(steps: &[TestStep]) -> Result<(), CoreError> {
    if steps.len() > MAX_STEPS {
        return Err(CoreError::Validation(format!(
            "A test case may have at most {MAX_STEPS} steps"
        )));
    }
    if let Some(idx) = steps.iter().position(|s| s.action.trim().is_empty()) {
        return Err(CoreError::Validation(format!(
            "Step {} must have a non-empty action",
            idx + 1
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn step(action: &str) -> TestStep {
        TestStep {
            action: action.to_string(),
            expected_result: None,
        }
    }

    #[test]
    fn known_priorities_pass() {
        for p in PRIORITIES {
            assert!(validate_priority(p).is_ok());
        }
        assert_matches!(validate_priority("urgent"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn known_case_types_pass() {
        assert!(validate_case_type("smoke").is_ok());
        assert_matches!(validate_case_type("exploratory"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_step_reports_its_position() {
        let err = validate_steps(&[step("open page"), step("  ")]).unwrap_err();
        assert!(err.to_string().contains("Step 2"));
    }

    #[test]
    fn too_many_steps_rejected() {
        let steps: Vec<_> = (0..=MAX_STEPS).map(|i| step(&format!("s{i}"))).collect();
        assert!(validate_steps(&steps).is_err());
    }

    #[test]
    fn step_expected_result_is_optional_in_json() {
        let parsed: TestStep = serde_json::from_str(r#"{"action":"click"}"#).unwrap();
        assert_eq!(parsed, step("click"));
    }
}
