//! QualityHub event bus and activity feed.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope carrying the tenant,
//!   project, and run scope used to pick notification rooms.
//! - [`ActivityRecorder`]: persists an activity row and announces it as
//!   `activity:new`.

pub mod activity;
pub mod bus;

pub use activity::ActivityRecorder;
pub use bus::{EventBus, PlatformEvent};
