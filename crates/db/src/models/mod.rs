//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches; nullable
//!   columns that a patch may clear use `Option<Option<T>>` with [`nullable`]
//!
//! Create and update DTOs derive `validator::Validate`; handlers call
//! `validate()` before touching the database.

pub mod activity;
pub mod milestone;
pub mod organization;
pub mod project;
pub mod requirement;
pub mod session;
pub mod test_case;
pub mod test_result;
pub mod test_run;
pub mod test_suite;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Deserialize a present field (including an explicit `null`) as `Some(..)`.
///
/// Pair with `#[serde(default)]` so an omitted field stays `None`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
