//! Handlers for the `/auth` resource (register, login, me, password
//! reset, email change).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use gradebook_core::error::CoreError;
use gradebook_core::roles::UserRole;
use gradebook_db::models::user::CreateUser;
use gradebook_db::repositories::UserRepo;

use crate::auth::jwt::{decode_reset_token, generate_reset_token, generate_session_token, ResetTokenError};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::response::{MessageResponse, TokenMessageResponse};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Response body for `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Response body for `GET /auth/me`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
}

/// Request body for `POST /auth/forgot-password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

/// Request body for `POST /auth/reset-password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Request body for `PUT /auth/change-email`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEmailRequest {
    #[validate(email)]
    pub email: String,
    #[validate(email)]
    pub new_email: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register
///
/// Create a new account. New users always get the Student role and the
/// configured placeholder avatar; the role never changes afterwards.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<Json<MessageResponse>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    tracing::info!(email = %input.email, "Registering user");

    // 1. Friendly duplicate check; uq_users_email backstops the race.
    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Email already in use".into(),
        )));
    }

    // 2. Hash the password. The plaintext is never stored or logged.
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // 3. Create the user.
    let create = CreateUser {
        email: input.email.clone(),
        password_hash,
        first_name: input.first_name,
        last_name: input.last_name,
        role: UserRole::Student,
        image: Some(state.config.default_user_image.clone()),
    };
    UserRepo::create(&state.pool, &create).await?;

    tracing::info!(email = %input.email, "User registered");
    Ok(Json(MessageResponse::new("You are now registered")))
}

/// POST /auth/login
///
/// Authenticate with email + password. Returns a 24-hour session token
/// whose payload carries only the user's id.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    // Unknown email and wrong password produce the same error: the
    // login endpoint must not reveal which one failed.
    let user = UserRepo::find_by_email(&state.pool, &input.email).await?;

    let verified = match &user {
        Some(user) => verify_password(&input.password, &user.password_hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?,
        None => false,
    };

    let Some(user) = user.filter(|_| verified) else {
        tracing::warn!(email = %input.email, "Failed login attempt");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid credentials".into(),
        )));
    };

    let token = generate_session_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(TokenResponse { token }))
}

/// GET /auth/me
///
/// Return the authenticated user's profile basics.
pub async fn me(AuthUser(user): AuthUser) -> AppResult<Json<MeResponse>> {
    Ok(Json(MeResponse {
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        role: user.role,
    }))
}

/// POST /auth/forgot-password
///
/// Issue a short-lived reset token and mail it to the account address.
/// Rate-limited to 3 requests per minute per email.
///
/// Note: a request for an unregistered address fails with a distinct
/// error, revealing whether the account exists. Preserved deliberately --
/// the client renders this message; the rate limiter bounds enumeration.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    if !state.reset_limiter.check(&input.email).await {
        return Err(AppError::RateLimited(
            "Too many password reset requests. Try again later.".into(),
        ));
    }

    let user = UserRepo::find_by_email(&state.pool, &input.email).await?;
    let Some(user) = user else {
        tracing::warn!(email = %input.email, "Forgot password for unknown email");
        return Err(AppError::Core(CoreError::Unauthorized(format!(
            "No user found for email: {}",
            input.email
        ))));
    };

    let token = generate_reset_token(&user.email, &state.config.reset_token)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    // Delivery failure surfaces as a failed request, not a silent drop.
    let Some(mailer) = &state.mailer else {
        return Err(AppError::InternalError(
            "Email delivery is not configured".into(),
        ));
    };
    mailer
        .send_reset_password_link(&user.email, &token)
        .await
        .map_err(|e| AppError::InternalError(format!("Email delivery error: {e}")))?;

    tracing::info!(email = %user.email, "Reset password link sent");
    Ok(Json(MessageResponse::new(
        "A confirmation link has been sent to your email.",
    )))
}

/// POST /auth/reset-password
///
/// Consume a reset token and store the new password.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let email = decode_reset_token(&input.token, &state.config.reset_token).map_err(|e| {
        AppError::BadRequest(match e {
            ResetTokenError::Expired => "Email confirmation token expired".into(),
            ResetTokenError::Invalid => "Bad confirmation token".into(),
        })
    })?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let updated = UserRepo::update_password(&state.pool, &email, &password_hash).await?;
    if !updated {
        return Err(AppError::Core(CoreError::NotFound(format!(
            "No user found for email: {email}"
        ))));
    }

    tracing::info!(email = %email, "Password reset");
    Ok(Json(MessageResponse::new("Password changed")))
}

/// PUT /auth/change-email
///
/// Change the account email and issue a fresh session token (the old
/// token keeps working until expiry -- it only names the user id).
pub async fn change_email(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Json(input): Json<ChangeEmailRequest>,
) -> AppResult<Json<TokenMessageResponse>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    if input.email == input.new_email {
        return Err(AppError::BadRequest(
            "The new email must be different from the current email.".into(),
        ));
    }

    if UserRepo::find_by_email(&state.pool, &input.new_email)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(format!(
            "There is already a user with the email: {}",
            input.new_email
        )));
    }

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(format!(
                "No user found for email: {}",
                input.email
            )))
        })?;

    UserRepo::update_email(&state.pool, &input.email, &input.new_email).await?;

    let token = generate_session_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "Email changed");
    Ok(Json(TokenMessageResponse {
        message: "Email changed",
        token,
    }))
}
