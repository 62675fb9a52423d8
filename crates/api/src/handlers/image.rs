//! Handler for the `/image` resource (avatar change).

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use gradebook_core::error::CoreError;
use gradebook_db::repositories::UserRepo;

use crate::auth::jwt::generate_session_token;
use crate::error::{AppError, AppResult};
use crate::response::TokenMessageResponse;
use crate::state::AppState;

/// Request body for `PUT /image/change-image`. The image arrives as a
/// base64 data string.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangeImageRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub image: String,
}

/// PUT /image/change-image
///
/// Replace the user's avatar and issue a fresh session token. No bearer
/// requirement -- the endpoint is keyed by email alone, matching the
/// contract existing clients use.
pub async fn change_image(
    State(state): State<AppState>,
    Json(input): Json<ChangeImageRequest>,
) -> AppResult<Json<TokenMessageResponse>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(format!(
                "No user found for email: {}",
                input.email
            )))
        })?;

    UserRepo::update_image(&state.pool, &input.email, &input.image).await?;

    let token = generate_session_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "Avatar changed");
    Ok(Json(TokenMessageResponse {
        message: "Image changed",
        token,
    }))
}
