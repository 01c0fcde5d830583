use sqlx::PgPool;

use crate::models::comedian::NewComedian;
use crate::models::{Comedian, UserRole};
use crate::services::membership::{discard_identity, find_or_create_identity};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{normalize_email, trimmed, validate_password};

#[derive(Debug, Clone)]
pub struct ComedianSignup {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub bio: String,
    pub instagram: Option<String>,
}

impl ComedianSignup {
    #[allow(clippy::too_many_arguments)]
    pub fn parse(
        email: Option<&str>,
        password: Option<&str>,
        display_name: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
        phone: Option<&str>,
        bio: Option<&str>,
        instagram: Option<&str>,
    ) -> AppResult<Self> {
        let (Some(email), Some(password), Some(display_name)) = (
            trimmed(email),
            password.filter(|p| !p.is_empty()),
            trimmed(display_name),
        ) else {
            return Err(AppError::ValidationError(
                "Email, password, and display name are required".to_string(),
            ));
        };
        validate_password(password)?;

        Ok(Self {
            email: normalize_email(&email),
            password: password.to_string(),
            display_name,
            city: trimmed(city),
            state: trimmed(state),
            phone: trimmed(phone),
            bio: trimmed(bio).unwrap_or_default(),
            // Stored without the leading @.
            instagram: trimmed(instagram).map(|handle| handle.trim_start_matches('@').to_string()),
        })
    }
}

/// Registers a pending comedian profile. The flag reports whether an
/// existing identity was reused.
pub async fn register(pool: &PgPool, signup: ComedianSignup) -> AppResult<(Comedian, bool)> {
    if Comedian::find_by_email(&signup.email, pool).await?.is_some() {
        return Err(AppError::Conflict(
            "An artist account with this email already exists".to_string(),
        ));
    }

    let (user, created) =
        find_or_create_identity(pool, &signup.email, &signup.password, UserRole::Artist).await?;

    let new_comedian = NewComedian {
        auth_id: user.id,
        display_name: signup.display_name,
        email: signup.email,
        phone: signup.phone,
        city: signup.city,
        state: signup.state,
        bio: signup.bio,
        instagram: signup.instagram,
    };

    match Comedian::insert(&new_comedian, pool).await {
        Ok(comedian) => {
            tracing::info!(
                comedian_id = %comedian.id,
                existing_account = !created,
                "Artist profile created"
            );
            Ok((comedian, !created))
        }
        Err(e) => {
            if created {
                discard_identity(pool, &user).await;
            }
            Err(AppError::conflict_on_unique(
                e,
                "An artist account already exists for this login",
            ))
        }
    }
}
