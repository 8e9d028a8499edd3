//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Reads on soft-deletable
//! tables exclude rows with `deleted_at` set.

pub mod activity_repo;
pub mod milestone_repo;
pub mod organization_repo;
pub mod project_repo;
pub mod requirement_repo;
pub mod session_repo;
pub mod test_case_repo;
pub mod test_result_repo;
pub mod test_run_repo;
pub mod test_suite_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepo;
pub use milestone_repo::MilestoneRepo;
pub use organization_repo::OrganizationRepo;
pub use project_repo::ProjectRepo;
pub use requirement_repo::RequirementRepo;
pub use session_repo::SessionRepo;
pub use test_case_repo::TestCaseRepo;
pub use test_result_repo::TestResultRepo;
pub use test_run_repo::TestRunRepo;
pub use test_suite_repo::TestSuiteRepo;
pub use user_repo::UserRepo;
