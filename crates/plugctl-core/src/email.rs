//! Out-of-band alert delivery.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::EmailConfig;
use crate::error::{PlugError, Result};

/// Implicit-TLS SMTP port; anything else negotiates STARTTLS.
const SMTPS_PORT: u16 = 465;

#[async_trait]
pub trait Emailer: Send + Sync {
    async fn email(&self, subject: &str, body: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// NoopEmailer
// ---------------------------------------------------------------------------

/// Used when no SMTP settings are configured. Alerts still reach the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEmailer;

#[async_trait]
impl Emailer for NoopEmailer {
    async fn email(&self, subject: &str, _body: &str) -> Result<()> {
        tracing::debug!("email disabled, not sending '{subject}'");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SmtpEmailer
// ---------------------------------------------------------------------------

/// Plain-text mail over authenticated SMTP.
pub struct SmtpEmailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpEmailer {
    pub fn from_config(cfg: &EmailConfig) -> Result<Self> {
        let from = parse_mailbox(&cfg.from)?;
        let to = parse_recipients(&cfg.to)?;

        let builder = if cfg.smtp_port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)
        };
        let builder =
            builder.map_err(|e| PlugError::InvalidConfig(format!("email.smtp_host: {e}")))?;

        let transport = builder
            .port(cfg.smtp_port)
            .credentials(Credentials::new(cfg.from.clone(), cfg.password.clone()))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }
}

#[async_trait]
impl Emailer for SmtpEmailer {
    async fn email(&self, subject: &str, body: &str) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        let message = builder
            .body(body.to_string())
            .map_err(|e| PlugError::Email(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| PlugError::Email(e.to_string()))?;
        Ok(())
    }
}

fn parse_mailbox(addr: &str) -> Result<Mailbox> {
    addr.trim()
        .parse::<Mailbox>()
        .map_err(|e| PlugError::InvalidConfig(format!("invalid email address '{addr}': {e}")))
}

/// Comma-separated recipient list; blanks are skipped, at least one required.
pub fn parse_recipients(list: &str) -> Result<Vec<Mailbox>> {
    let to = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_mailbox)
        .collect::<Result<Vec<_>>>()?;
    if to.is_empty() {
        return Err(PlugError::InvalidConfig("email.to is empty".to_string()));
    }
    Ok(to)
}
