use axum::{extract::State, response::Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AuthUser, StaffUser};
use crate::models::comedian::ComedianProfileUpdate;
use crate::models::{Comedian, ComedianStatus};
use crate::services::comedian::{self, ComedianSignup};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub instagram: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub comedian: Comedian,
    pub existing_account: bool,
}

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> Result<Response, AppError> {
    let signup = ComedianSignup::parse(
        body.email.as_deref(),
        body.password.as_deref(),
        body.display_name.as_deref(),
        body.city.as_deref(),
        body.state.as_deref(),
        body.phone.as_deref(),
        body.bio.as_deref(),
        body.instagram.as_deref(),
    )?;

    let (comedian, existing_account) = comedian::register(&state.db, signup).await?;
    let message = if existing_account {
        "Artist profile created for your existing account, pending review"
    } else {
        "Account created, pending review"
    };

    Ok(created(
        SignupResponse {
            comedian,
            existing_account,
        },
        message,
    ))
}

async fn own_profile(state: &AppState, user: &AuthUser) -> Result<Comedian, AppError> {
    Comedian::find_by_auth_id(user.user_id, &state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist profile not found".to_string()))
}

pub async fn get_me(State(state): State<AppState>, user: AuthUser) -> Result<Response, AppError> {
    let comedian = own_profile(&state, &user).await?;
    Ok(success(comedian, "Profile retrieved"))
}

pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(update): ApiJson<ComedianProfileUpdate>,
) -> Result<Response, AppError> {
    if update.is_empty() {
        return Err(AppError::ValidationError("No valid fields to update".to_string()));
    }
    if matches!(update.display_name.as_deref(), Some(name) if name.trim().is_empty()) {
        return Err(AppError::ValidationError(
            "Display name cannot be empty".to_string(),
        ));
    }

    let comedian = own_profile(&state, &user).await?;
    let updated = Comedian::update_profile(comedian.id, &update, &state.db).await?;

    Ok(success(updated, "Profile updated"))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

fn parse_status(raw: &str) -> Result<ComedianStatus, AppError> {
    raw.parse::<ComedianStatus>()
        .map_err(AppError::ValidationError)
}

pub async fn list_comedians(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Response, AppError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_status)
        .transpose()?;

    let comedians = Comedian::list(status, &state.db).await?;
    Ok(success(comedians, "Artists retrieved"))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

pub async fn set_status(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<StatusRequest>,
) -> Result<Response, AppError> {
    let raw = body
        .status
        .ok_or_else(|| AppError::ValidationError("Status is required".to_string()))?;
    let status = parse_status(&raw)?;

    let comedian = Comedian::set_status(id, status, &state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist not found".to_string()))?;

    tracing::info!(comedian_id = %comedian.id, status = %status, by = %staff.user_id, "Artist status changed");
    Ok(success(comedian, "Artist status updated"))
}
