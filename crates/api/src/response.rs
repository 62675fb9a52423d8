//! Shared response types for API handlers.
//!
//! Success messages use a `{ "message": ... }` body, the same shape as
//! the error responses. Use [`MessageResponse`] instead of ad-hoc
//! `serde_json::json!` calls to keep the serialization consistent.

use serde::Serialize;

/// Standard `{ "message": ... }` response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// `{ "message": ..., "token": ... }` body for operations that re-issue
/// a session token (email change, avatar change).
#[derive(Debug, Serialize)]
pub struct TokenMessageResponse {
    pub message: &'static str,
    pub token: String,
}
