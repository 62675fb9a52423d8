//! Session-token and password-reset-token generation/validation.
//!
//! Session tokens are HS256-signed JWTs whose payload carries only the
//! user's database id -- role and profile are loaded fresh from the store
//! on every request, never cached in the token. Reset tokens embed the
//! account email and are signed with a separate secret so a leaked
//! session-signing key cannot mint password resets (and vice versa).

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use gradebook_core::types::DbId;

/// JWT claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id. The only identity
    /// information the token carries.
    pub sub: DbId,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Claims embedded in a password-reset token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResetClaims {
    /// The account email the reset was requested for.
    pub email: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Configuration for session token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify session tokens.
    pub secret: String,
    /// Session token lifetime in hours (default: 24).
    pub session_expiry_hours: i64,
}

/// Configuration for password-reset tokens. Separate secret and expiry
/// from the session tokens.
#[derive(Debug, Clone)]
pub struct ResetTokenConfig {
    /// HMAC-SHA256 secret for reset tokens.
    pub secret: String,
    /// Reset token lifetime in minutes (default: 60).
    pub expiry_mins: i64,
}

/// Default session token expiry in hours.
const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 24;
/// Default reset token expiry in minutes.
const DEFAULT_RESET_EXPIRY_MINS: i64 = 60;

impl JwtConfig {
    /// Load session-token configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_SESSION_EXPIRY_HOURS` | no       | `24`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let session_expiry_hours: i64 = std::env::var("JWT_SESSION_EXPIRY_HOURS")
            .unwrap_or_else(|_| DEFAULT_SESSION_EXPIRY_HOURS.to_string())
            .parse()
            .expect("JWT_SESSION_EXPIRY_HOURS must be a valid i64");

        Self {
            secret,
            session_expiry_hours,
        }
    }
}

impl ResetTokenConfig {
    /// Load reset-token configuration from environment variables.
    ///
    /// | Env Var                   | Required | Default |
    /// |---------------------------|----------|---------|
    /// | `RESET_TOKEN_SECRET`      | **yes**  | --      |
    /// | `RESET_TOKEN_EXPIRY_MINS` | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `RESET_TOKEN_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("RESET_TOKEN_SECRET")
            .expect("RESET_TOKEN_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "RESET_TOKEN_SECRET must not be empty");

        let expiry_mins: i64 = std::env::var("RESET_TOKEN_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_RESET_EXPIRY_MINS.to_string())
            .parse()
            .expect("RESET_TOKEN_EXPIRY_MINS must be a valid i64");

        Self { secret, expiry_mins }
    }
}

/// Generate an HS256 session token for the given user.
pub fn generate_session_token(
    user_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now + config.session_expiry_hours * 3600;

    let claims = Claims {
        sub: user_id,
        exp,
        iat: now,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode a session token, returning the embedded [`Claims`].
///
/// Validates the signature and expiration automatically.
pub fn validate_session_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}

/// Generate a password-reset token embedding the account email.
pub fn generate_reset_token(
    email: &str,
    config: &ResetTokenConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now + config.expiry_mins * 60;

    let claims = ResetClaims {
        email: email.to_string(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Outcome of decoding a reset token, distinguishing expiry from every
/// other failure so the handler can word its error accordingly.
#[derive(Debug, PartialEq, Eq)]
pub enum ResetTokenError {
    Expired,
    Invalid,
}

/// Validate a password-reset token and extract the embedded email.
pub fn decode_reset_token(
    token: &str,
    config: &ResetTokenConfig,
) -> Result<String, ResetTokenError> {
    match decode::<ResetClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Ok(data.claims.email),
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(ResetTokenError::Expired),
            _ => Err(ResetTokenError::Invalid),
        },
    }
}
