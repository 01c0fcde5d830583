use axum::{extract::State, response::Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::StaffUser;
use crate::models::{Member, MemberStatus};
use crate::services::membership::{self, Enrollment};
use crate::services::token;
use crate::state::AppState;
use crate::utils::csv;
use crate::utils::error::AppError;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};
use crate::utils::response::{attachment, created, success};
use crate::utils::validation::{like_pattern, trimmed};

const SEARCH_MIN_CHARS: usize = 2;
const SEARCH_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub member_id: Uuid,
    pub email_sent: bool,
    pub sms_sent: bool,
}

pub async fn join(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<JoinRequest>,
) -> Result<Response, AppError> {
    let enrollment = Enrollment::parse(
        body.first_name.as_deref(),
        body.last_name.as_deref(),
        body.email.as_deref(),
        body.password.as_deref(),
        body.phone.as_deref(),
    )?;

    let (member, delivery) = membership::enroll(&state, enrollment).await?;

    Ok(created(
        JoinResponse {
            member_id: member.id,
            email_sent: delivery.email_sent,
            sms_sent: delivery.sms_sent,
        },
        "Welcome! Check your email for your membership card",
    ))
}

pub async fn list_members(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> Result<Response, AppError> {
    let members = Member::list_all(&state.db).await?;
    Ok(success(members, "Members retrieved"))
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Staff may only move a member between active, suspended and cancelled.
fn parse_admin_status(raw: Option<&str>) -> Result<Option<MemberStatus>, AppError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.parse::<MemberStatus>() {
        Ok(status) if status.is_staff_assignable() => Ok(Some(status)),
        _ => Err(AppError::ValidationError(format!(
            "Status must be one of active, suspended, cancelled (got '{}')",
            raw
        ))),
    }
}

pub async fn update_member(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateMemberRequest>,
) -> Result<Response, AppError> {
    let status = parse_admin_status(body.status.as_deref())?;
    if status.is_none() && body.notes.is_none() {
        return Err(AppError::ValidationError("No valid fields to update".to_string()));
    }

    let member = Member::update_admin_fields(id, status, body.notes.as_deref(), &state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    tracing::info!(member_id = %member.id, status = %member.status, by = %staff.user_id, "Member updated");
    Ok(success(member, "Member updated"))
}

pub async fn rotate_token(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Response, AppError> {
    let member = Member::rotate_token(id, &token::generate_token(), &state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    tracing::info!(member_id = %member.id, by = %staff.user_id, "Membership token rotated");
    Ok(success(member, "Membership token rotated"))
}

pub fn members_csv(members: &[Member]) -> String {
    let mut out = String::new();
    csv::write_row(
        &mut out,
        ["First Name", "Last Name", "Email", "Phone", "Status", "Notes", "Joined"].map(Some),
    );
    for m in members {
        let joined = m.created_at.format("%Y-%m-%d").to_string();
        csv::write_row(
            &mut out,
            [
                Some(m.first_name.as_str()),
                Some(m.last_name.as_str()),
                Some(m.email.as_str()),
                m.phone.as_deref(),
                Some(m.status.as_str()),
                m.notes.as_deref(),
                Some(joined.as_str()),
            ],
        );
    }
    out
}

pub async fn export_members(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> Result<Response, AppError> {
    let members = Member::list_all(&state.db).await?;
    Ok(attachment(
        "text/csv; charset=utf-8",
        "members.csv",
        members_csv(&members),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub async fn search_members(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Response, AppError> {
    let q = trimmed(query.q.as_deref()).unwrap_or_default();
    if q.chars().count() < SEARCH_MIN_CHARS {
        return Ok(success(Vec::<()>::new(), "Query too short"));
    }

    let results = Member::search(&like_pattern(&q), SEARCH_LIMIT, &state.db).await?;
    Ok(success(results, "Search results"))
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    pub token: Option<String>,
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UnsubscribeRequest>,
) -> Result<Response, AppError> {
    let token = trimmed(body.token.as_deref())
        .ok_or_else(|| AppError::ValidationError("Token is required".to_string()))?;

    let member = Member::find_by_token(&token, &state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;
    if member.status == MemberStatus::Cancelled {
        return Err(AppError::ValidationError(
            "This membership is already cancelled".to_string(),
        ));
    }

    Member::set_status(member.id, MemberStatus::Cancelled, &state.db).await?;
    tracing::info!(member_id = %member.id, "Member unsubscribed");

    Ok(success(
        serde_json::json!({ "status": MemberStatus::Cancelled }),
        "Your membership has been cancelled",
    ))
}
