// Infrastructure traits for outbound notifications, so handlers can be
// exercised without SendGrid or Twilio credentials.

use anyhow::Result;
use async_trait::async_trait;

pub mod booking;
pub mod comedian;
pub mod email;
pub mod lineup_order;
pub mod membership;
pub mod qr;
pub mod sms;
pub mod token;

/// An inline image attached to an email and referenced as `cid:{content_id}`.
#[derive(Debug, Clone)]
pub struct InlineAttachment {
    pub content_id: String,
    pub filename: String,
    pub mime_type: String,
    /// Base64 encoded file content.
    pub content_base64: String,
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<InlineAttachment>,
}

#[async_trait]
pub trait BaseEmailService: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<()>;
}

#[async_trait]
pub trait BaseSmsService: Send + Sync {
    /// Send a plain text message to an E.164 phone number.
    async fn send_sms(&self, to: &str, body: &str) -> Result<()>;
}
