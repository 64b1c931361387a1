use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

use crate::config::SmtpSettings;
use crate::errors::AppError;

/// Delivers a plain-text message to the site operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<(), AppError>;
}

/// Sends operator notifications through an SMTP relay (STARTTLS).
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    /// Creates a new `SmtpNotifier`.
    ///
    /// # Arguments
    ///
    /// * `settings` - Relay host, port and credentials.
    /// * `to` - Operator address receiving the notifications.
    pub fn new(settings: &SmtpSettings, to: &str) -> Result<Self, AppError> {
        let from: Mailbox = settings.from.parse().map_err(|e| {
            AppError::InternalError(format!("Invalid SMTP sender '{}': {}", settings.from, e))
        })?;
        let to: Mailbox = to.parse().map_err(|e| {
            AppError::InternalError(format!("Invalid notification address '{}': {}", to, e))
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| {
                AppError::InternalError(format!("Invalid SMTP relay '{}': {}", settings.host, e))
            })?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(30)))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<(), AppError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::InternalError(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::ExternalApiError(format!("SMTP delivery failed: {}", e)))?;

        tracing::info!("✓ Notification sent to {}", self.to);
        Ok(())
    }
}

/// Fallback used when no SMTP relay is configured: the message only goes to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<(), AppError> {
        tracing::info!("📧 {} (SMTP disabled)\n{}", subject, body);
        Ok(())
    }
}
