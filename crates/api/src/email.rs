//! Password-reset email delivery via SMTP.
//!
//! [`EmailSender`] wraps the `lettre` async SMTP transport to send the
//! plain-text reset-link mail. Configuration is loaded from environment
//! variables; if `SMTP_HOST` is not set, [`EmailConfig::from_env`]
//! returns `None` and no mailer should be constructed.

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@gradebook.local";

/// Default base URL of the frontend reset-password page.
const DEFAULT_RESET_PASSWORD_URL: &str = "http://localhost:4200/reset-password";

/// Configuration for the SMTP email sender.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
    /// Frontend page the reset link points at; the token is appended as
    /// a query parameter.
    pub reset_password_url: String,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable              | Required | Default                                  |
    /// |-----------------------|----------|------------------------------------------|
    /// | `SMTP_HOST`           | yes      | —                                        |
    /// | `SMTP_PORT`           | no       | `587`                                    |
    /// | `SMTP_FROM`           | no       | `noreply@gradebook.local`                |
    /// | `SMTP_USER`           | no       | —                                        |
    /// | `SMTP_PASSWORD`       | no       | —                                        |
    /// | `RESET_PASSWORD_URL`  | no       | `http://localhost:4200/reset-password`   |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
            reset_password_url: std::env::var("RESET_PASSWORD_URL")
                .unwrap_or_else(|_| DEFAULT_RESET_PASSWORD_URL.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailSender
// ---------------------------------------------------------------------------

/// Sends password-reset mail via SMTP.
pub struct EmailSender {
    config: EmailConfig,
}

impl EmailSender {
    /// Create a new email sender with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send the reset-password link for `to_email` carrying `token`.
    ///
    /// Delivery failure propagates to the caller; the forgot-password
    /// request surfaces it rather than pretending the mail went out.
    pub async fn send_reset_password_link(
        &self,
        to_email: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let url = format!("{}?token={}", self.config.reset_password_url, token);
        let body = format!("Hi,\nTo reset your password, click here: {url}");

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject("Reset password")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = to_email, "Reset password email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
