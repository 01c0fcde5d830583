use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::config::TwilioConfig;
use crate::services::BaseSmsService;

#[derive(Debug, Clone)]
pub struct TwilioSmsService {
    client: Client,
    config: TwilioConfig,
}

impl TwilioSmsService {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{sid}/Messages.json",
            sid = self.config.account_sid
        )
    }
}

#[async_trait]
impl BaseSmsService for TwilioSmsService {
    async fn send_sms(&self, to: &str, body: &str) -> Result<()> {
        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", to);
        form_body.insert("From", &self.config.from_number);
        form_body.insert("Body", body);

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form_body)
            .send()
            .await
            .context("Request to Twilio failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Twilio returned {}: {}", status, error_body));
        }

        tracing::info!(to = %to, "SMS sent");
        Ok(())
    }
}

pub fn membership_sms(venue_name: &str, first_name: &str, card_url: &str) -> String {
    format!(
        "Welcome to {}, {}! Your membership is active. View your digital card & QR code here: {}",
        venue_name, first_name, card_url
    )
}
