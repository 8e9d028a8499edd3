pub mod activity;
pub mod auth;
pub mod cases;
pub mod milestones;
pub mod organization;
pub mod projects;
pub mod requirements;
pub mod runs;
pub mod scope;
pub mod suites;
pub mod users;
