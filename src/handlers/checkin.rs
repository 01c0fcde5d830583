use axum::{extract::State, response::Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::StaffUser;
use crate::models::{Checkin, Member};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::{ApiJson, ApiPath};
use crate::utils::response::{created, success};
use crate::utils::validation::trimmed;

/// Door lookup after a QR scan.
pub async fn scan_member(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiPath(token): ApiPath<String>,
) -> Result<Response, AppError> {
    let member = Member::lookup_by_token(&token, &state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    Ok(success(member, "Member found"))
}

#[derive(Debug, Deserialize)]
pub struct CheckinRequest {
    pub member_id: Option<Uuid>,
    pub notes: Option<String>,
}

pub async fn check_in(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    ApiJson(body): ApiJson<CheckinRequest>,
) -> Result<Response, AppError> {
    let member_id = body
        .member_id
        .ok_or_else(|| AppError::ValidationError("member_id is required".to_string()))?;

    let member = Member::find_by_id(member_id, &state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    if !member.status.admits_checkin() {
        return Err(AppError::Forbidden(format!("Member is {}", member.status)));
    }

    let notes = trimmed(body.notes.as_deref());
    let checkin = Checkin::insert(member.id, staff.user_id, notes.as_deref(), &state.db).await?;

    tracing::info!(member_id = %member.id, by = %staff.user_id, "Member checked in");
    Ok(created(checkin, "Checked in"))
}
