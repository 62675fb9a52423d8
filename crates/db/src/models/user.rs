//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use gradebook_core::roles::UserRole;
use gradebook_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserSummary`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub image: Option<String>,
    pub created_at: Timestamp,
}

impl User {
    /// Build the sanitized projection of this user.
    ///
    /// `default_image` is the configured placeholder avatar, applied when
    /// the user has not uploaded one.
    pub fn summary(&self, default_image: &str) -> UserSummary {
        UserSummary {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            role: self.role,
            image: self
                .image
                .clone()
                .unwrap_or_else(|| default_image.to_string()),
        }
    }
}

/// Safe user representation for API responses (no id, no password hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub image: String,
}

/// DTO for creating a new user. The password is hashed before it gets here.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub image: Option<String>,
}
