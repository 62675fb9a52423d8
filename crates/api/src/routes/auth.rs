//! Route definitions for the `/auth` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register         -> register
/// POST /login            -> login
/// GET  /me               -> me (requires auth)
/// POST /forgot-password  -> forgot_password (rate-limited)
/// POST /reset-password   -> reset_password
/// PUT  /change-email     -> change_email (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route("/change-email", put(auth::change_email))
}
