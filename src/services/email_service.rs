//! # Email Service
//!
//! Outbound mail for the password-reset flow. [`SmtpMailer`] sends through
//! lettre's async SMTP transport; [`LogMailer`] is used when no SMTP host is
//! configured and only writes the message to the log.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::MailConfig;

/// A plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailBody {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: MailBody) -> Result<()>;
}

pub struct SmtpMailer {
    from_address: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .context("Failed to configure SMTP relay")?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from_address: config.from_address.clone(),
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: MailBody) -> Result<()> {
        let message = Message::builder()
            .from(self.from_address.parse().context("Invalid sender address")?)
            .to(mail.to.parse().context("Invalid recipient address")?)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.text)
            .context("Failed to build email")?;

        self.transport
            .send(message)
            .await
            .context("SMTP delivery failed")?;

        tracing::info!(to = %mail.to, "Email sent");
        Ok(())
    }
}

/// Writes outgoing mail to the log instead of delivering it
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: MailBody) -> Result<()> {
        tracing::warn!(to = %mail.to, "SMTP_HOST not set, email not delivered");
        tracing::debug!(subject = %mail.subject, "{}", mail.text);
        Ok(())
    }
}
