use sqlx::PgPool;

use crate::auth::PasswordService;
use crate::models::member::NewMember;
use crate::models::{Member, User, UserRole};
use crate::services::email::{membership_email, MembershipEmail};
use crate::services::{qr, sms, token};
use crate::state::AppState;
use crate::utils::error::{is_unique_violation, AppError, AppResult};
use crate::utils::validation::{normalize_email, trimmed, validate_password};

/// A validated membership application.
#[derive(Debug, Clone)]
pub struct Enrollment {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

impl Enrollment {
    pub fn parse(
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
        phone: Option<&str>,
    ) -> AppResult<Self> {
        let (Some(first_name), Some(last_name), Some(email), Some(password)) = (
            trimmed(first_name),
            trimmed(last_name),
            trimmed(email),
            password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::ValidationError(
                "First name, last name, email, and password are required".to_string(),
            ));
        };
        validate_password(password)?;

        Ok(Self {
            first_name,
            last_name,
            email: normalize_email(&email),
            password: password.to_string(),
            phone: trimmed(phone),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub email_sent: bool,
    pub sms_sent: bool,
}

/// Returns the identity registered under `email`, creating one with `role`
/// when none exists. The flag is true when the identity was created here.
pub async fn find_or_create_identity(
    pool: &PgPool,
    email: &str,
    password: &str,
    role: UserRole,
) -> AppResult<(User, bool)> {
    if let Some(user) = User::find_by_email(email, pool).await? {
        return Ok((user, false));
    }

    let hash = PasswordService::hash_password(password)?;
    match User::create(email, &hash, role, pool).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, role = role.as_str(), "Identity created");
            Ok((user, true))
        }
        // Lost a race with a concurrent signup for the same address.
        Err(e) if is_unique_violation(&e) => User::find_by_email(email, pool)
            .await?
            .map(|user| (user, false))
            .ok_or(AppError::DatabaseError(e)),
        Err(e) => Err(e.into()),
    }
}

/// Removes an identity created for a signup that then failed.
pub async fn discard_identity(pool: &PgPool, user: &User) {
    if let Err(e) = User::delete(user.id, pool).await {
        tracing::error!(user_id = %user.id, error = ?e, "Failed to remove orphaned identity");
    }
}

/// Creates the member record and sends the welcome card.
pub async fn enroll(state: &AppState, enrollment: Enrollment) -> AppResult<(Member, Delivery)> {
    let (user, created) = find_or_create_identity(
        &state.db,
        &enrollment.email,
        &enrollment.password,
        UserRole::Member,
    )
    .await?;

    let new_member = NewMember {
        auth_id: user.id,
        first_name: enrollment.first_name,
        last_name: enrollment.last_name,
        email: enrollment.email,
        phone: enrollment.phone,
        membership_token: token::generate_token(),
    };

    let member = match Member::insert(&new_member, &state.db).await {
        Ok(member) => member,
        Err(e) => {
            if created {
                discard_identity(&state.db, &user).await;
            }
            return Err(AppError::conflict_on_unique(
                e,
                "This email is already registered as a member",
            ));
        }
    };

    tracing::info!(member_id = %member.id, "Member enrolled");

    let delivery = send_welcome(state, &member).await;
    Ok((member, delivery))
}

/// Emails the card (and texts the link when possible). Failures are logged
/// and reported in the result, never returned as errors.
pub async fn send_welcome(state: &AppState, member: &Member) -> Delivery {
    let config = &state.config;
    let card_url = config.card_url(&member.membership_token);
    let mut delivery = Delivery::default();

    match qr::render_png_base64(&config.scan_url(&member.membership_token)) {
        Ok(qr_png_base64) => {
            let message = membership_email(MembershipEmail {
                venue_name: &config.venue_name,
                to: &member.email,
                first_name: &member.first_name,
                last_name: &member.last_name,
                card_url: &card_url,
                qr_png_base64,
            });
            match state.email().send(message).await {
                Ok(()) => delivery.email_sent = true,
                Err(e) => {
                    tracing::warn!(member_id = %member.id, error = %e, "Membership email failed")
                }
            }
        }
        Err(e) => tracing::error!(member_id = %member.id, error = ?e, "QR code rendering failed"),
    }

    if let (Some(phone), Some(sms_service)) = (member.phone.as_deref(), state.sms()) {
        let body = sms::membership_sms(&config.venue_name, &member.first_name, &card_url);
        match sms_service.send_sms(phone, &body).await {
            Ok(()) => delivery.sms_sent = true,
            Err(e) => tracing::warn!(member_id = %member.id, error = %e, "Membership SMS failed"),
        }
    }

    delivery
}
