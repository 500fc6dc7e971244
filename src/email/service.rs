//! Email delivery through an HTTP mail API.
//!
//! The handler talks to the [`Mailer`] trait; production wires in
//! [`HttpMailer`], which posts to the provider's REST endpoint with a
//! bounded timeout. Tests substitute their own implementation or point the
//! base URL at a local mock.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::schema::EmailConfig;

/// A message ready to hand to the mail API.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Failures the mail collaborator can report.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("mail API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail API returned status {0}")]
    Status(u16),

    #[error("email credentials not configured")]
    NotConfigured,
}

/// The email collaborator seam.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &OutboundEmail) -> Result<(), EmailError>;
}

#[derive(Serialize)]
struct SendPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Mailer backed by an HTTP mail API (Resend-style `POST /emails`).
pub struct HttpMailer {
    client: reqwest::Client,
    config: EmailConfig,
}

impl HttpMailer {
    pub fn new(config: EmailConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &OutboundEmail) -> Result<(), EmailError> {
        if self.config.user.is_empty() || self.config.password.is_empty() {
            tracing::error!("Email credentials not configured");
            return Err(EmailError::NotConfigured);
        }

        let payload = SendPayload {
            from: &self.config.user,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.config.api_base))
            .bearer_auth(&self.config.password)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(to = %message.to, subject = %message.subject, "Email delivered");
            Ok(())
        } else {
            tracing::error!(to = %message.to, status = %status, "Mail API rejected send");
            Err(EmailError::Status(status.as_u16()))
        }
    }
}
