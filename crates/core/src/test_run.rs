//! Test run lifecycle and result aggregation.
//!
//! Status strings must match the `CHECK` constraints on `test_runs.status`
//! and `test_results.status`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// RunStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    InProgress,
    Completed,
    Aborted,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Aborted => "aborted",
        }
    }

    /// Terminal runs accept no further transitions or results.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Aborted)
    }

    /// Whether results may still be recorded against a run in this state.
    pub fn accepts_results(&self) -> bool {
        !self.is_terminal()
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step.
    ///
    /// ```text
    /// pending ──start──▶ in_progress ──complete──▶ completed
    ///    └──────abort──────┴──────────abort──────▶ aborted
    /// ```
    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        matches!(
            (self, next),
            (RunStatus::Pending, RunStatus::InProgress)
                | (RunStatus::InProgress, RunStatus::Completed)
                | (RunStatus::Pending, RunStatus::Aborted)
                | (RunStatus::InProgress, RunStatus::Aborted)
        )
    }

    /// Validate a transition, producing a `Conflict` error when it is illegal.
    pub fn transition_to(&self, next: RunStatus) -> Result<RunStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::Conflict(format!(
                "Cannot move test run from '{}' to '{}'",
                self.as_str(),
                next.as_str()
            )))
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RunStatus::Pending),
            "in_progress" => Ok(RunStatus::InProgress),
            "completed" => Ok(RunStatus::Completed),
            "aborted" => Ok(RunStatus::Aborted),
            other => Err(CoreError::Validation(format!(
                "Unknown test run status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ResultStatus
// ---------------------------------------------------------------------------

/// Outcome of executing a single test case within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Passed,
    Failed,
    Blocked,
    Skipped,
    Retest,
}

impl ResultStatus {
    pub const ALL: [ResultStatus; 5] = [
        ResultStatus::Passed,
        ResultStatus::Failed,
        ResultStatus::Blocked,
        ResultStatus::Skipped,
        ResultStatus::Retest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Passed => "passed",
            ResultStatus::Failed => "failed",
            ResultStatus::Blocked => "blocked",
            ResultStatus::Skipped => "skipped",
            ResultStatus::Retest => "retest",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResultStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown test result status '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// RunSummary
// ---------------------------------------------------------------------------

/// Aggregated result counts for a run.
///
/// Built from the *latest* result of each test case, so re-running a case
/// replaces its earlier outcome rather than adding to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: i64,
    pub passed: i64,
    pub failed: i64,
    pub blocked: i64,
    pub skipped: i64,
    pub retest: i64,
    /// Percentage of `passed` over `total`, rounded to two decimals.
    pub pass_rate: f64,
}

impl RunSummary {
    /// Build a summary from the latest status of each executed case.
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = ResultStatus>,
    {
        let mut summary = RunSummary::default();
        for status in statuses {
            summary.total += 1;
            match status {
                ResultStatus::Passed => summary.passed += 1,
                ResultStatus::Failed => summary.failed += 1,
                ResultStatus::Blocked => summary.blocked += 1,
                ResultStatus::Skipped => summary.skipped += 1,
                ResultStatus::Retest => summary.retest += 1,
            }
        }
        summary.pass_rate = percentage(summary.passed, summary.total);
        summary
    }
}

/// `part / whole * 100` rounded to two decimals; zero when `whole` is zero.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    let raw = part as f64 / whole as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn legal_transitions() {
        assert!(RunStatus::Pending.can_transition_to(RunStatus::InProgress));
        assert!(RunStatus::InProgress.can_transition_to(RunStatus::Completed));
        assert!(RunStatus::Pending.can_transition_to(RunStatus::Aborted));
        assert!(RunStatus::InProgress.can_transition_to(RunStatus::Aborted));
    }

    #[test]
    fn completing_a_pending_run_is_a_conflict() {
        assert_matches!(
            RunStatus::Pending.transition_to(RunStatus::Completed),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for terminal in [RunStatus::Completed, RunStatus::Aborted] {
            assert!(terminal.is_terminal());
            assert!(!terminal.accepts_results());
            for next in [
                RunStatus::Pending,
                RunStatus::InProgress,
                RunStatus::Completed,
                RunStatus::Aborted,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn starting_twice_is_rejected() {
        assert!(!RunStatus::InProgress.can_transition_to(RunStatus::InProgress));
    }

    #[test]
    fn status_strings_parse() {
        assert_eq!("in_progress".parse::<RunStatus>().unwrap(), RunStatus::InProgress);
        assert_eq!("retest".parse::<ResultStatus>().unwrap(), ResultStatus::Retest);
        assert_matches!("done".parse::<RunStatus>(), Err(CoreError::Validation(_)));
        assert_matches!("ok".parse::<ResultStatus>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&RunStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn empty_summary_has_zero_pass_rate() {
        let summary = RunSummary::from_statuses(Vec::new());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.pass_rate, 0.0);
    }

    #[test]
    fn summary_counts_each_status() {
        use ResultStatus::*;
        let summary = RunSummary::from_statuses([Passed, Passed, Failed, Blocked, Skipped, Retest]);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.blocked, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.retest, 1);
        assert_eq!(summary.pass_rate, 33.33);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(3, 3), 100.0);
        assert_eq!(percentage(1, 0), 0.0);
    }
}
