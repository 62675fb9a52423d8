//! Role-check extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not match. A failed role check is a 401 Unauthorized ("Insufficient
//! permissions") -- distinct from the 400 BadRequest produced by
//! ownership checks inside handlers. Clients depend on that split, so it
//! must not be normalized to 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use gradebook_core::error::CoreError;
use gradebook_core::roles::UserRole;
use gradebook_db::models::user::User;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `teacher` role.
///
/// ```ignore
/// async fn teacher_only(RequireTeacher(user): RequireTeacher) -> AppResult<Json<()>> {
///     // user is guaranteed to be a teacher here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireTeacher(pub User);

impl FromRequestParts<AppState> for RequireTeacher {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Teacher {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Insufficient permissions".into(),
            )));
        }
        Ok(RequireTeacher(user))
    }
}

/// Requires the `student` role.
pub struct RequireStudent(pub User);

impl FromRequestParts<AppState> for RequireStudent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Student {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Insufficient permissions".into(),
            )));
        }
        Ok(RequireStudent(user))
    }
}
