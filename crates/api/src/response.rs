//! Shared response envelope types for API handlers.
//!
//! Every successful response is `{ "success": true, "data": ..., "timestamp": ... }`.
//! Use [`ApiResponse`] instead of ad-hoc `json!` bodies to keep the shape
//! consistent; errors use the matching envelope in [`crate::error`].

use axum::http::StatusCode;
use axum::Json;
use qualityhub_core::types::{DbId, Timestamp};
use serde::Serialize;

/// Standard success envelope.
///
/// ```ignore
/// Ok(Json(ApiResponse::new(project)))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub timestamp: Timestamp,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// `200 OK` with the payload wrapped in the envelope.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::new(data))
}

/// `201 Created` with the payload wrapped in the envelope.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::new(data)))
}

/// One page of a list endpoint.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T: Serialize> Page<T> {
    /// Page over a fully loaded list.
    pub fn slice(all: Vec<T>, limit: i64, offset: i64) -> Self {
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Self {
            items,
            total,
            limit,
            offset,
        }
    }
}

/// Body returned by soft deletes.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: DbId,
    pub deleted: bool,
}

impl Deleted {
    pub fn new(id: DbId) -> Self {
        Self { id, deleted: true }
    }
}
