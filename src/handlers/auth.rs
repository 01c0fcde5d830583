use axum::{extract::State, response::Response};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthUser, PasswordService};
use crate::models::User;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::ApiJson;
use crate::utils::response::success;
use crate::utils::validation::{normalize_email, trimmed};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Response, AppError> {
    let (Some(email), Some(password)) = (trimmed(body.email.as_deref()), body.password) else {
        return Err(AppError::ValidationError(
            "Email and password are required".to_string(),
        ));
    };
    let email = normalize_email(&email);

    let invalid = || AppError::AuthError("Invalid email or password".to_string());
    let user = User::find_by_email(&email, &state.db)
        .await?
        .ok_or_else(invalid)?;
    if !PasswordService::verify_password(&password, &user.password_hash) {
        return Err(invalid());
    }

    let token = state.jwt().create_token(user.id, &user.email, user.role)?;
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User logged in");

    Ok(success(LoginResponse { token, user }, "Login successful"))
}

pub async fn me(user: AuthUser) -> Response {
    success(user, "Current user")
}
