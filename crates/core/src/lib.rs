//! QualityHub domain core.
//!
//! Pure logic shared by the database, event, and API crates. Nothing in here
//! performs I/O.

pub mod error;
pub mod event_names;
pub mod milestone;
pub mod naming;
pub mod pagination;
pub mod requirement;
pub mod roles;
pub mod rooms;
pub mod test_case;
pub mod test_run;
pub mod types;
