//! Refresh sessions.
//!
//! Only the SHA-256 digest of a refresh token is stored. A session is live
//! while it is unrevoked and unexpired; refreshing consumes it.

use sqlx::FromRow;

use qualityhub_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Issued on register, login, and every refresh.
pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    /// Client hints recorded for auditing only.
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}
