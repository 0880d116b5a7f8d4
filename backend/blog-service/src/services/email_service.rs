/// Email delivery for registration confirmation and password recovery
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::config::EmailConfig;
use crate::error::{AppError, Result};

const OUTBOX_CAPACITY: usize = 100;

/// A message as handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Async email transport wrapper (SMTP or no-op)
///
/// Without an SMTP host the service only logs, and keeps the most recent
/// messages in an in-memory outbox that local tooling and tests can read.
#[derive(Clone)]
pub struct EmailService {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
    frontend_url: String,
    outbox: Arc<Mutex<Vec<OutgoingEmail>>>,
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid SMTP_FROM address: {}", e)))?;

        let transport = if config.smtp_host.trim().is_empty() {
            warn!("SMTP host not configured; email service will operate in no-op mode");
            None
        } else {
            let builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);

            let builder = if config.smtp_username.is_empty() {
                builder
            } else {
                builder.credentials(Credentials::new(
                    config.smtp_username.clone(),
                    config.smtp_password.clone(),
                ))
            };

            Some(Arc::new(builder.build()))
        };

        Ok(Self {
            transport,
            from,
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
            outbox: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Check if SMTP transport is enabled
    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    pub async fn send_confirmation_email(&self, recipient: &str, code: &str) -> Result<()> {
        let link = format!("{}/confirm-email?code={}", self.frontend_url, code);
        let body = format!(
            "Thank you for your registration!\n\n\
             To finish registration please follow the link below:\n{}\n\n\
             If you did not sign up, ignore this email.",
            link
        );
        self.send_mail(recipient, "Confirm your registration", &body)
            .await
    }

    pub async fn send_password_recovery_email(&self, recipient: &str, code: &str) -> Result<()> {
        let link = format!("{}/password-recovery?recoveryCode={}", self.frontend_url, code);
        let body = format!(
            "We received a password recovery request.\n\n\
             To set a new password please follow the link below:\n{}\n\n\
             If you did not request this, ignore this email.",
            link
        );
        self.send_mail(recipient, "Password recovery", &body).await
    }

    /// Snapshot of messages recorded in no-op mode, oldest first
    pub fn outbox(&self) -> Vec<OutgoingEmail> {
        self.outbox
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    async fn send_mail(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let Some(transport) = &self.transport else {
            info!(
                subject,
                recipient, "Email service running in no-op mode; skipping actual send"
            );
            self.record(OutgoingEmail {
                recipient: recipient.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
            return Ok(());
        };

        let email = Message::builder()
            .from(self.from.clone())
            .to(recipient.parse::<Mailbox>()?)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        transport.send(email).await?;
        info!(subject, "email sent successfully");
        Ok(())
    }

    fn record(&self, message: OutgoingEmail) {
        if let Ok(mut outbox) = self.outbox.lock() {
            if outbox.len() >= OUTBOX_CAPACITY {
                outbox.remove(0);
            }
            outbox.push(message);
        }
    }
}
