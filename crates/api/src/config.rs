use crate::auth::jwt::{JwtConfig, ResetTokenConfig};
use crate::background::backup::BackupConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the token secrets have sensible defaults suitable
/// for local development. In production, override via environment
/// variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Placeholder avatar assigned at registration and substituted into
    /// user projections when no image is set. Threaded through explicitly;
    /// nothing else reads the env var.
    pub default_user_image: String,
    /// Session token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Password-reset token configuration (its own secret and expiry).
    pub reset_token: ResetTokenConfig,
    /// Nightly database backup settings.
    pub backup: BackupConfig,
}

/// Default placeholder avatar path.
const DEFAULT_USER_IMAGE: &str = "/assets/default-avatar.png";

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:4200`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DEFAULT_USER_IMAGE`   | `/assets/default-avatar.png` |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:4200".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let default_user_image =
            std::env::var("DEFAULT_USER_IMAGE").unwrap_or_else(|_| DEFAULT_USER_IMAGE.into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            default_user_image,
            jwt: JwtConfig::from_env(),
            reset_token: ResetTokenConfig::from_env(),
            backup: BackupConfig::from_env(),
        }
    }
}
