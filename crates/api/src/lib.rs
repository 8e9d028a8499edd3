//! QualityHub API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! WebSocket gateway) so integration tests and the binaries can share them.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod ws;
