use std::env;

use anyhow::{Context, Result};

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/venue";

#[derive(Debug, Clone)]
pub struct SendGridConfig {
    pub api_key: String,
    pub from_email: String,
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Public origin used to build card and scan links.
    pub base_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    pub venue_name: String,
    pub default_show_venue: String,
    pub sendgrid: Option<SendGridConfig>,
    pub twilio: Option<TwilioConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Fails when `JWT_SECRET` is
    /// missing or blank, since tokens signed with a guessable key would pass
    /// the staff check.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = non_empty("JWT_SECRET").context("JWT_SECRET must be set")?;

        let sendgrid = match (non_empty("SENDGRID_API_KEY"), non_empty("SENDGRID_FROM_EMAIL")) {
            (Some(api_key), Some(from_email)) => Some(SendGridConfig {
                api_key,
                from_email,
            }),
            _ => None,
        };

        let twilio = match (
            non_empty("TWILIO_ACCOUNT_SID"),
            non_empty("TWILIO_AUTH_TOKEN"),
            non_empty("TWILIO_PHONE_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            port: lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(3001),
            base_url: lookup("BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            jwt_secret,
            jwt_expiration_hours: lookup("JWT_EXPIRATION_HOURS")
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),
            venue_name: lookup("VENUE_NAME").unwrap_or_else(|| "Kings Court".to_string()),
            default_show_venue: lookup("DEFAULT_SHOW_VENUE")
                .unwrap_or_else(|| "Kings Court Boston".to_string()),
            sendgrid,
            twilio,
        })
    }

    /// The database URL alone, for tools that never issue tokens.
    pub fn database_url_from_env() -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
    }

    pub fn card_url(&self, token: &str) -> String {
        format!("{}/m/{}", self.base_url, token)
    }

    /// The URL encoded into a member's QR code.
    pub fn scan_url(&self, token: &str) -> String {
        format!("{}/scan/m/{}", self.base_url, token)
    }
}
