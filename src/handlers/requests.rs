use axum::{extract::State, response::Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::{BookingRequest, BookingStatus, Comedian};
use crate::services::booking::{self, SubmitRequest};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub show_id: Option<Uuid>,
    pub requested_set_length: Option<i32>,
    pub message: Option<String>,
}

pub async fn create_request(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<CreateRequestBody>,
) -> Result<Response, AppError> {
    let show_id = body
        .show_id
        .ok_or_else(|| AppError::ValidationError("show_id is required".to_string()))?;
    if matches!(body.requested_set_length, Some(len) if len <= 0) {
        return Err(AppError::ValidationError(
            "requested_set_length must be positive".to_string(),
        ));
    }

    let request = booking::submit(
        &state.db,
        &user,
        SubmitRequest {
            show_id,
            requested_set_length: body.requested_set_length,
            message: body.message.unwrap_or_default(),
        },
    )
    .await?;

    let message = if request.status == BookingStatus::Waitlisted {
        "Show is full, you have been added to the waitlist"
    } else {
        "Request submitted"
    };
    Ok(created(request, message))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub show_id: Option<Uuid>,
    pub my: Option<bool>,
}

#[derive(Debug, PartialEq, Eq)]
enum RequestScope {
    All,
    Comedian(Uuid),
    Nothing,
}

/// Comedians only ever see their own requests. Staff see everything unless
/// they ask for their own and have a comedian profile to filter by.
fn request_scope(is_staff: bool, wants_mine: bool, profile: Option<Uuid>) -> RequestScope {
    match (wants_mine, profile) {
        (true, Some(id)) => RequestScope::Comedian(id),
        (true, None) if !is_staff => RequestScope::Nothing,
        _ => RequestScope::All,
    }
}

pub async fn list_requests(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Response, AppError> {
    let wants_mine = !user.is_staff() || query.my.unwrap_or(false);
    let profile = if wants_mine {
        Comedian::find_by_auth_id(user.user_id, &state.db).await?
    } else {
        None
    };

    let comedian_id = match request_scope(user.is_staff(), wants_mine, profile.map(|c| c.id)) {
        RequestScope::All => None,
        RequestScope::Comedian(id) => Some(id),
        RequestScope::Nothing => return Ok(success(Vec::<()>::new(), "Requests retrieved")),
    };

    let requests = BookingRequest::list_detailed(query.show_id, comedian_id, &state.db).await?;
    Ok(success(requests, "Requests retrieved"))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: Option<String>,
}

pub async fn update_request(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateStatusBody>,
) -> Result<Response, AppError> {
    let status = body
        .status
        .ok_or_else(|| AppError::ValidationError("Status is required".to_string()))?
        .parse::<BookingStatus>()
        .map_err(AppError::ValidationError)?;

    let request = booking::change_status(&state.db, &user, id, status).await?;
    Ok(success(request, "Request updated"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_without_profile_sees_all_even_when_asking_for_mine() {
        assert_eq!(request_scope(true, true, None), RequestScope::All);
        assert_eq!(request_scope(true, false, None), RequestScope::All);
    }

    #[test]
    fn test_profile_filters_to_own_requests() {
        let id = Uuid::new_v4();
        assert_eq!(request_scope(true, true, Some(id)), RequestScope::Comedian(id));
        assert_eq!(request_scope(false, true, Some(id)), RequestScope::Comedian(id));
    }

    #[test]
    fn test_non_staff_without_profile_sees_nothing() {
        assert_eq!(request_scope(false, true, None), RequestScope::Nothing);
    }
}
