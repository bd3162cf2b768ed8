//! Outbound transactional email.
//!
//! `AuthEmail` builds the confirmation and password-reset messages; a `Mailer` delivers
//! them. `SmtpMailer` hands them to a mail relay, `LogMailer` writes them to the log when no
//! relay is configured. Delivery is best-effort: callers log a failed send and carry on.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::SmtpSettings;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), AppError>;
}

/// Who an account email is addressed to and which token it carries.
pub struct Recipient<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub token: &'a str,
}

/// Builds the account emails.
pub struct AuthEmail {
    from: String,
    token_ttl_minutes: i64,
}

impl AuthEmail {
    pub fn new(from: impl Into<String>, token_ttl_minutes: i64) -> Self {
        Self {
            from: from.into(),
            token_ttl_minutes,
        }
    }

    pub fn confirmation(&self, recipient: &Recipient<'_>) -> Email {
        Email {
            from: self.from.clone(),
            to: recipient.email.to_string(),
            subject: "UpTask - Confirm your account".to_string(),
            text: format!(
                "Hi {}, you have created your account on UpTask. \
                 Everything is almost ready, you just need to confirm your account.\n\n\
                 Enter your code: {}\n\n\
                 This code expires in {} minutes.",
                recipient.name, recipient.token, self.token_ttl_minutes
            ),
        }
    }

    pub fn password_reset(&self, recipient: &Recipient<'_>) -> Email {
        Email {
            from: self.from.clone(),
            to: recipient.email.to_string(),
            subject: "UpTask - Reset your password".to_string(),
            text: format!(
                "Hi {}, you have requested to reset your password.\n\n\
                 Enter your code: {}\n\n\
                 This code expires in {} minutes.",
                recipient.name, recipient.token, self.token_ttl_minutes
            ),
        }
    }
}

fn mailbox(address: &str) -> Result<Mailbox, AppError> {
    address
        .parse()
        .map_err(|e| AppError::InternalServerError(format!("Invalid address {}: {}", address, e)))
}

/// Converts an `Email` into a plain-text MIME message.
pub fn mime_message(email: &Email) -> Result<Message, AppError> {
    Message::builder()
        .from(mailbox(&email.from)?)
        .to(mailbox(&email.to)?)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(email.text.clone())
        .map_err(|e| AppError::InternalServerError(format!("Failed to build email: {}", e)))
}

/// Sends through an SMTP relay with STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, AppError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| AppError::InternalServerError(format!("SMTP relay: {}", e)))?
            .port(settings.port);
        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: Email) -> Result<(), AppError> {
        let message = mime_message(&email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::InternalServerError(format!("SMTP send failed: {}", e)))?;
        Ok(())
    }
}

/// Writes every message to the application log instead of a mail relay.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), AppError> {
        log::info!(
            "mail to={} subject={:?}\n{}",
            email.to,
            email.subject,
            email.text
        );
        Ok(())
    }
}

/// Keeps sent messages in memory so they can be inspected later.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<Email>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Email> {
        self.sent.lock().await.clone()
    }

    pub async fn last_to(&self, to: &str) -> Option<Email> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|email| email.to == to)
            .cloned()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: Email) -> Result<(), AppError> {
        self.sent.lock().await.push(email);
        Ok(())
    }
}

/// Sends `email`, logging instead of failing when delivery does not succeed.
pub async fn deliver(mailer: &dyn Mailer, email: Email) {
    let to = email.to.clone();
    match mailer.send(email).await {
        Ok(()) => log::info!("Message sent to {}", to),
        Err(err) => log::warn!("Failed to send message to {}: {}", to, err),
    }
}
