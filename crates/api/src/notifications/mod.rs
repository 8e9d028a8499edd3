//! Delivery of platform events to WebSocket rooms.

pub mod router;

pub use router::NotificationRouter;
