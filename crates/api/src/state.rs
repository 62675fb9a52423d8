use std::sync::Arc;

use crate::config::ServerConfig;
use crate::email::EmailSender;
use crate::rate_limit::RateLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gradebook_db::DbPool,
    /// Server configuration (token secrets, default avatar, backup settings).
    pub config: Arc<ServerConfig>,
    /// SMTP sender for password-reset mail. `None` when SMTP is not
    /// configured; forgot-password then fails loudly instead of silently
    /// dropping mail.
    pub mailer: Option<Arc<EmailSender>>,
    /// Sliding-window limiter guarding the forgot-password endpoint.
    pub reset_limiter: RateLimiter,
}
