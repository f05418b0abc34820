//! Mail provider adapter.
//!
//! [`MailProvider`] delivers one email to one recipient. Ordinary delivery
//! failures (SMTP rejections, bad recipient addresses) come back inside
//! [`SendOutcome`] so the approval fan-out can continue through them and
//! attribute failures per recipient; `Err` is reserved for dispatch-level
//! faults such as a malformed sender address or a broken transport.
//!
//! [`SmtpMailer`] is the production implementation, speaking STARTTLS SMTP
//! via the `lettre` async transport. Configuration is loaded from
//! environment variables; if `SMTP_HOST` is not set the mailer is
//! unconfigured and every send reports an ordinary failure.

use async_trait::async_trait;

/// Per-recipient delivery result. `success == false` is an ordinary,
/// expected failure, not an exception.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub success: bool,
    pub detail: String,
}

impl SendOutcome {
    pub fn ok(detail: impl Into<String>) -> Self {
        Self {
            success: true,
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: detail.into(),
        }
    }
}

/// Dispatch-level mail faults, distinct from per-recipient failures.
#[derive(Debug, thiserror::Error)]
pub enum MailProviderError {
    /// The configured sender address could not be parsed.
    #[error("Invalid sender address: {0}")]
    Sender(String),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// The SMTP transport could not be constructed.
    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// External service that delivers a single email to one recipient.
#[async_trait]
pub trait MailProvider: Send + Sync {
    /// Whether the provider can actually reach a mail server.
    fn is_configured(&self) -> bool;

    /// Send one email. Ordinary delivery failures are reported in the
    /// returned [`SendOutcome`], never as `Err`.
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<SendOutcome, MailProviderError>;
}

// ---------------------------------------------------------------------------
// SMTP implementation
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@formrelay.local";

/// Configuration for the SMTP mailer.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
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
}

impl SmtpConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured.
    ///
    /// | Variable        | Required | Default                    |
    /// |-----------------|----------|----------------------------|
    /// | `SMTP_HOST`     | yes      | —                          |
    /// | `SMTP_PORT`     | no       | `587`                      |
    /// | `SMTP_FROM`     | no       | `noreply@formrelay.local`  |
    /// | `SMTP_USER`     | no       | —                          |
    /// | `SMTP_PASSWORD` | no       | —                          |
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
        })
    }
}

/// [`MailProvider`] backed by an SMTP relay.
pub struct SmtpMailer {
    config: Option<SmtpConfig>,
}

impl SmtpMailer {
    /// Create a mailer with the given (possibly absent) configuration.
    pub fn new(config: Option<SmtpConfig>) -> Self {
        Self { config }
    }

    /// Create a mailer configured from the environment.
    pub fn from_env() -> Self {
        Self::new(SmtpConfig::from_env())
    }

    async fn deliver(
        &self,
        config: &SmtpConfig,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<SendOutcome, MailProviderError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let from = config
            .from_address
            .parse()
            .map_err(|e| MailProviderError::Sender(format!("{}: {e}", config.from_address)))?;

        // A bad recipient address is an ordinary per-recipient failure.
        let to = match recipient.parse() {
            Ok(to) => to,
            Err(e) => {
                return Ok(SendOutcome::failed(format!(
                    "Invalid recipient address {recipient}: {e}"
                )))
            }
        };

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailProviderError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| MailProviderError::Transport(e.to_string()))?
                .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        match mailer.send(email).await {
            Ok(_) => {
                tracing::info!(to = recipient, "Email sent via SMTP");
                Ok(SendOutcome::ok(format!(
                    "Email successfully sent to {recipient} via SMTP"
                )))
            }
            Err(e) => {
                tracing::warn!(to = recipient, error = %e, "SMTP delivery failed");
                Ok(SendOutcome::failed(format!("SMTP error: {e}")))
            }
        }
    }
}

#[async_trait]
impl MailProvider for SmtpMailer {
    fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<SendOutcome, MailProviderError> {
        match &self.config {
            Some(config) => self.deliver(config, recipient, subject, body).await,
            None => {
                tracing::warn!(to = recipient, "SMTP not configured; email not sent");
                Ok(SendOutcome::failed(
                    "SMTP_HOST is not set; email delivery is not configured",
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        std::env::remove_var("SMTP_HOST");
        assert!(SmtpConfig::from_env().is_none());
    }

    #[tokio::test]
    async fn unconfigured_mailer_reports_ordinary_failure() {
        let mailer = SmtpMailer::new(None);
        assert!(!mailer.is_configured());

        let outcome = mailer.send("a@x.com", "S", "B").await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.detail.contains("not configured"));
    }

    #[tokio::test]
    async fn bad_sender_address_is_a_dispatch_fault() {
        let mailer = SmtpMailer::new(Some(SmtpConfig {
            smtp_host: "smtp.example".to_string(),
            smtp_port: 587,
            from_address: "not an address".to_string(),
            smtp_user: None,
            smtp_password: None,
        }));

        let err = mailer.send("a@x.com", "S", "B").await.unwrap_err();
        assert!(matches!(err, MailProviderError::Sender(_)));
    }

    #[tokio::test]
    async fn bad_recipient_address_is_a_per_recipient_failure() {
        let mailer = SmtpMailer::new(Some(SmtpConfig {
            smtp_host: "smtp.example".to_string(),
            smtp_port: 587,
            from_address: "noreply@formrelay.local".to_string(),
            smtp_user: None,
            smtp_password: None,
        }));

        let outcome = mailer.send("definitely not an email", "S", "B").await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.detail.contains("Invalid recipient address"));
    }
}
