//! Outbound mail for password recovery and the contact form.
//!
//! Uses SMTP via lettre when a relay is configured.

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Mutex;
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::errors::ServiceError;

/// A plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), ServiceError>;

    /// Address mail is sent from; the contact form is delivered here too
    fn from_address(&self) -> &str;
}

/// SMTP delivery through a STARTTLS relay
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        from_address: String,
    ) -> Result<Self, ServiceError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| ServiceError::EmailError(e.to_string()))?
            .port(port);

        if let (Some(username), Some(password)) = (username, password) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            mailer: builder.build(),
            from_address,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, email), fields(to = %email.to, subject = %email.subject))]
    async fn send(&self, email: &OutgoingEmail) -> Result<(), ServiceError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| ServiceError::EmailError(format!("Invalid email address: {}", self.from_address)))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|_| ServiceError::EmailError(format!("Invalid email address: {}", email.to)))?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| ServiceError::EmailError(e.to_string()))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| ServiceError::EmailError(e.to_string()))?;

        info!("Email sent successfully");
        Ok(())
    }

    fn from_address(&self) -> &str {
        &self.from_address
    }
}

/// Writes mail to the log instead of delivering it
pub struct LogMailer {
    from_address: String,
}

impl LogMailer {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), ServiceError> {
        info!(to = %email.to, subject = %email.subject, body = %email.body, "SMTP not configured; email logged");
        Ok(())
    }

    fn from_address(&self) -> &str {
        &self.from_address
    }
}

/// Keeps every message in memory; can be told to fail
pub struct RecordingMailer {
    from_address: String,
    fail: bool,
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
            fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(from_address: impl Into<String>) -> Self {
        Self {
            fail: true,
            ..Self::new(from_address)
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), ServiceError> {
        if self.fail {
            return Err(ServiceError::EmailError("relay refused connection".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email.clone());
        }
        Ok(())
    }

    fn from_address(&self) -> &str {
        &self.from_address
    }
}

/// SMTP when `smtp_host` is set, logging otherwise
pub fn mailer_from_app_config(cfg: &AppConfig) -> Result<std::sync::Arc<dyn Mailer>, ServiceError> {
    Ok(match cfg.smtp_host.as_deref() {
        Some(host) if !host.trim().is_empty() => std::sync::Arc::new(SmtpMailer::new(
            host,
            cfg.smtp_port,
            cfg.smtp_username.clone(),
            cfg.smtp_password.clone(),
            cfg.email_from.clone(),
        )?),
        _ => std::sync::Arc::new(LogMailer::new(cfg.email_from.clone())),
    })
}
