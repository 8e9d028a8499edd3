//! Shared query parameter types for API handlers.
//!
//! List endpoints accept flat query strings, so filter structs repeat the
//! pagination fields instead of flattening [`PaginationParams`].

use qualityhub_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use qualityhub_core::types::DbId;
use qualityhub_db::models::test_case::TestCaseFilter;
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Clamped `(limit, offset)`.
    pub fn resolve(&self) -> (i64, i64) {
        resolve(self.limit, self.offset)
    }
}

/// `GET /projects/{pid}/cases` filters.
#[derive(Debug, Default, Deserialize)]
pub struct CaseListParams {
    pub suite_id: Option<DbId>,
    pub priority: Option<String>,
    pub case_type: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl CaseListParams {
    pub fn resolve(&self) -> (i64, i64) {
        resolve(self.limit, self.offset)
    }

    pub fn filter(&self) -> TestCaseFilter {
        TestCaseFilter {
            suite_id: self.suite_id,
            priority: self.priority.clone(),
            case_type: self.case_type.clone(),
            search: self.search.clone(),
        }
    }
}

/// `GET /projects/{pid}/runs` filters.
#[derive(Debug, Default, Deserialize)]
pub struct RunListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl RunListParams {
    pub fn resolve(&self) -> (i64, i64) {
        resolve(self.limit, self.offset)
    }
}

fn resolve(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(offset),
    )
}
