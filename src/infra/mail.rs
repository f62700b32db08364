//! Outbound mail.
//!
//! `SmtpMailer` delivers through a STARTTLS relay. When no relay is
//! configured, `LogMailer` writes the message to the log instead so the
//! reset flow stays usable in development.

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::MailSettings;
use crate::errors::{AppError, AppResult};

/// A single outbound email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Mail dispatcher
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message. Failures are returned as-is; there is no retry.
    async fn send(&self, message: MailMessage) -> AppResult<()>;
}

/// Pick the mailer for the given settings.
pub fn mailer_from_settings(settings: &MailSettings) -> AppResult<std::sync::Arc<dyn Mailer>> {
    match settings.smtp_host {
        Some(_) => Ok(std::sync::Arc::new(SmtpMailer::new(settings)?)),
        None => {
            tracing::warn!("SMTP not configured - emails will be logged instead of sent");
            Ok(std::sync::Arc::new(LogMailer))
        }
    }
}

/// SMTP relay mailer
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(settings: &MailSettings) -> AppResult<Self> {
        let host = settings
            .smtp_host
            .as_deref()
            .ok_or_else(|| AppError::internal("SMTP_HOST is not set"))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::mail(format!("Invalid SMTP relay {}: {}", host, e)))?
            .port(settings.smtp_port);

        if let (Some(user), Some(pass)) = (settings.smtp_user.as_ref(), settings.smtp_pass()) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.to_string()));
        }

        tracing::info!(host = %host, port = settings.smtp_port, "SMTP mailer configured");
        Ok(Self {
            transport: builder.build(),
        })
    }
}

fn mailbox(address: &str) -> AppResult<Mailbox> {
    address
        .parse()
        .map_err(|e| AppError::mail(format!("Invalid address {}: {}", address, e)))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: MailMessage) -> AppResult<()> {
        let email = Message::builder()
            .from(mailbox(&message.from)?)
            .to(mailbox(&message.to)?)
            .subject(message.subject)
            .multipart(MultiPart::alternative_plain_html(message.text, message.html))
            .map_err(|e| AppError::mail(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AppError::mail(e.to_string()))?;

        tracing::info!(to = %message.to, "Email sent");
        Ok(())
    }
}

/// Development mailer: logs instead of sending
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> AppResult<()> {
        tracing::info!(
            "=== EMAIL (not sent) ===\n\
             From: {}\n\
             To: {}\n\
             Subject: {}\n\
             Body:\n{}\n\
             ========================",
            message.from,
            message.to,
            message.subject,
            message.html
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mailbox_parsing() {
        assert!(mailbox("Shopfront <noreply@example.com>").is_ok());
        assert!(mailbox("a@b.com").is_ok());
        assert!(matches!(mailbox("Test email"), Err(AppError::Mail(_))));
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_message() {
        let message = MailMessage {
            from: "noreply@example.com".to_string(),
            to: "a@b.com".to_string(),
            subject: "Reset password".to_string(),
            text: "text".to_string(),
            html: "<p>html</p>".to_string(),
        };
        assert!(LogMailer.send(message).await.is_ok());
    }

    #[test]
    fn test_unconfigured_settings_pick_log_mailer() {
        let settings = MailSettings::new(None, 587, "noreply@example.com");
        assert!(mailer_from_settings(&settings).is_ok());
    }
}
