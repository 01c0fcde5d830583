use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::JwtService;
use crate::config::Config;
use crate::services::email::{LoggingEmailService, SendGridEmailService};
use crate::services::sms::TwilioSmsService;
use crate::services::{BaseEmailService, BaseSmsService};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    jwt_service: JwtService,
    email: Arc<dyn BaseEmailService>,
    sms: Option<Arc<dyn BaseSmsService>>,
}

impl AppState {
    /// Wires the outbound services from configuration: SendGrid when
    /// configured (logging otherwise), Twilio only when configured.
    pub fn new(db: PgPool, config: Config) -> Self {
        let email: Arc<dyn BaseEmailService> = match config.sendgrid.clone() {
            Some(sendgrid) => Arc::new(SendGridEmailService::new(sendgrid)),
            None => {
                tracing::warn!("SendGrid not configured, membership emails will only be logged");
                Arc::new(LoggingEmailService)
            }
        };
        let sms: Option<Arc<dyn BaseSmsService>> = match config.twilio.clone() {
            Some(twilio) => Some(Arc::new(TwilioSmsService::new(twilio))),
            None => {
                tracing::info!("Twilio not configured, SMS disabled");
                None
            }
        };

        Self::with_services(db, config, email, sms)
    }

    pub fn with_services(
        db: PgPool,
        config: Config,
        email: Arc<dyn BaseEmailService>,
        sms: Option<Arc<dyn BaseSmsService>>,
    ) -> Self {
        let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);
        Self {
            db,
            config: Arc::new(config),
            jwt_service,
            email,
            sms,
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn email(&self) -> &dyn BaseEmailService {
        self.email.as_ref()
    }

    pub fn sms(&self) -> Option<&dyn BaseSmsService> {
        self.sms.as_deref()
    }
}
