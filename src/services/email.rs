use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::config::SendGridConfig;
use crate::services::{BaseEmailService, EmailMessage, InlineAttachment};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone)]
pub struct SendGridEmailService {
    client: Client,
    config: SendGridConfig,
}

impl SendGridEmailService {
    pub fn new(config: SendGridConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn payload(&self, message: &EmailMessage) -> serde_json::Value {
        let attachments: Vec<_> = message
            .attachments
            .iter()
            .map(|a| {
                json!({
                    "content": a.content_base64,
                    "filename": a.filename,
                    "type": a.mime_type,
                    "disposition": "inline",
                    "content_id": a.content_id,
                })
            })
            .collect();

        let mut body = json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": self.config.from_email },
            "subject": message.subject,
            "content": [{ "type": "text/html", "value": message.html }],
        });
        if !attachments.is_empty() {
            body["attachments"] = json!(attachments);
        }
        body
    }
}

#[async_trait]
impl BaseEmailService for SendGridEmailService {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        let response = self
            .client
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&self.config.api_key)
            .json(&self.payload(&message))
            .send()
            .await
            .context("Request to SendGrid failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(anyhow!("SendGrid returned {}: {}", status, error_body));
        }

        tracing::info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}

/// Used when SendGrid is not configured: the message is logged, not delivered.
#[derive(Debug, Clone, Default)]
pub struct LoggingEmailService;

#[async_trait]
impl BaseEmailService for LoggingEmailService {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            attachments = message.attachments.len(),
            "Email delivery disabled, message not sent"
        );
        Ok(())
    }
}

pub struct MembershipEmail<'a> {
    pub venue_name: &'a str,
    pub to: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub card_url: &'a str,
    pub qr_png_base64: String,
}

/// The welcome email with the membership QR code attached inline.
pub fn membership_email(params: MembershipEmail<'_>) -> EmailMessage {
    let venue = html_escape(params.venue_name);
    let html = format!(
        r#"<div style="font-family: sans-serif; max-width: 500px; margin: 0 auto; padding: 20px;">
  <h1 style="color: #1a1a2e; text-align: center;">{venue}</h1>
  <h2 style="color: #333; text-align: center;">Welcome, {first} {last}!</h2>
  <p style="color: #555; text-align: center;">Your membership is now active. Show the QR code below when you check in.</p>
  <div style="text-align: center; margin: 24px 0;">
    <img src="cid:qrcode" alt="Membership QR Code" width="250" height="250" />
  </div>
  <p style="text-align: center;">
    <a href="{card_url}" style="display: inline-block; padding: 12px 24px; background: #1a1a2e; color: #fff; text-decoration: none; border-radius: 6px;">View Your Digital Card</a>
  </p>
  <p style="color: #999; font-size: 12px; text-align: center; margin-top: 32px;">Keep this email. It contains your membership QR code.</p>
</div>"#,
        venue = venue,
        first = html_escape(params.first_name),
        last = html_escape(params.last_name),
        card_url = html_escape(params.card_url),
    );

    EmailMessage {
        to: params.to.to_string(),
        subject: format!("Welcome to {} - Your Membership Card", params.venue_name),
        html,
        attachments: vec![InlineAttachment {
            content_id: "qrcode".to_string(),
            filename: "qrcode.png".to_string(),
            mime_type: "image/png".to_string(),
            content_base64: params.qr_png_base64,
        }],
    }
}

pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EmailMessage {
        membership_email(MembershipEmail {
            venue_name: "Kings Court",
            to: "ada@example.com",
            first_name: "Ada",
            last_name: "<Lovelace>",
            card_url: "http://localhost:3000/m/tok",
            qr_png_base64: "iVBORw0KGgo=".to_string(),
        })
    }

    #[test]
    fn test_membership_email_contents() {
        let message = sample();
        assert_eq!(message.to, "ada@example.com");
        assert!(message.subject.contains("Kings Court"));
        assert!(message.html.contains("http://localhost:3000/m/tok"));
        assert!(message.html.contains("cid:qrcode"));
        assert!(message.html.contains("&lt;Lovelace&gt;"));
        assert_eq!(message.attachments[0].content_id, "qrcode");
        assert_eq!(message.attachments[0].mime_type, "image/png");
        assert_eq!(message.attachments[0].filename, "qrcode.png");
    }

    #[test]
    fn test_sendgrid_payload_shape() {
        let service = SendGridEmailService::new(SendGridConfig {
            api_key: "key".to_string(),
            from_email: "door@example.com".to_string(),
        });
        let payload = service.payload(&sample());

        assert_eq!(payload["personalizations"][0]["to"][0]["email"], "ada@example.com");
        assert_eq!(payload["from"]["email"], "door@example.com");
        assert_eq!(payload["attachments"][0]["disposition"], "inline");
        assert_eq!(payload["attachments"][0]["content"], "iVBORw0KGgo=");
        assert_eq!(payload["attachments"][0]["type"], "image/png");
    }

    #[tokio::test]
    async fn test_logging_service_accepts_everything() {
        assert!(LoggingEmailService.send(sample()).await.is_ok());
    }
}
