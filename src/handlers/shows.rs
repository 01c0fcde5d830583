use axum::{extract::State, response::Response};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{AuthUser, StaffUser};
use crate::models::show::{NewShow, ShowUpdate, DEFAULT_CAPACITY_SLOTS};
use crate::models::{Show, ShowStatus};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};
use crate::utils::response::{created, success};
use crate::utils::validation::trimmed;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub upcoming: Option<bool>,
}

pub async fn list_shows(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Response, AppError> {
    let upcoming_from = query
        .upcoming
        .unwrap_or(false)
        .then(|| Utc::now().date_naive());

    let shows = Show::list_with_counts(upcoming_from, &state.db).await?;
    Ok(success(shows, "Shows retrieved"))
}

/// Shared body for create and update; dates and times arrive as the
/// strings an HTML form produces.
#[derive(Debug, Default, Deserialize)]
pub struct ShowRequest {
    pub show_name: Option<String>,
    pub show_date: Option<String>,
    pub start_time: Option<String>,
    pub venue: Option<String>,
    pub capacity_slots: Option<i32>,
    pub notes: Option<String>,
    pub eventbrite_url: Option<String>,
    pub status: Option<String>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::ValidationError(format!("Invalid show_date '{}'", raw)))
}

/// Accepts `HH:MM` or `HH:MM:SS`.
fn parse_time(raw: &str) -> Result<NaiveTime, AppError> {
    let raw_trimmed = raw.trim();
    NaiveTime::parse_from_str(raw_trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw_trimmed, "%H:%M"))
        .map_err(|_| AppError::ValidationError(format!("Invalid start_time '{}'", raw)))
}

fn validate_capacity(capacity: i32) -> Result<i32, AppError> {
    if capacity <= 0 {
        return Err(AppError::ValidationError(
            "capacity_slots must be a positive number".to_string(),
        ));
    }
    Ok(capacity)
}

impl ShowRequest {
    fn into_new_show(self, default_venue: &str, created_by: Uuid) -> Result<NewShow, AppError> {
        let (Some(show_name), Some(show_date), Some(start_time)) = (
            trimmed(self.show_name.as_deref()),
            trimmed(self.show_date.as_deref()),
            trimmed(self.start_time.as_deref()),
        ) else {
            return Err(AppError::ValidationError(
                "show_name, show_date, and start_time are required".to_string(),
            ));
        };

        Ok(NewShow {
            show_name,
            show_date: parse_date(&show_date)?,
            start_time: parse_time(&start_time)?,
            venue: trimmed(self.venue.as_deref()).unwrap_or_else(|| default_venue.to_string()),
            capacity_slots: validate_capacity(self.capacity_slots.unwrap_or(DEFAULT_CAPACITY_SLOTS))?,
            notes: self.notes.unwrap_or_default(),
            eventbrite_url: self.eventbrite_url.unwrap_or_default(),
            created_by,
        })
    }

    fn into_update(self) -> Result<ShowUpdate, AppError> {
        let show_name = match self.show_name {
            Some(name) => Some(trimmed(Some(name.as_str())).ok_or_else(|| {
                AppError::ValidationError("show_name cannot be empty".to_string())
            })?),
            None => None,
        };

        Ok(ShowUpdate {
            show_name,
            show_date: self.show_date.as_deref().map(parse_date).transpose()?,
            start_time: self.start_time.as_deref().map(parse_time).transpose()?,
            venue: trimmed(self.venue.as_deref()),
            capacity_slots: self.capacity_slots.map(validate_capacity).transpose()?,
            notes: self.notes,
            eventbrite_url: self.eventbrite_url,
            status: self
                .status
                .as_deref()
                .map(|s| s.parse::<ShowStatus>().map_err(AppError::ValidationError))
                .transpose()?,
        })
    }
}

pub async fn create_show(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    ApiJson(body): ApiJson<ShowRequest>,
) -> Result<Response, AppError> {
    let new_show = body.into_new_show(&state.config.default_show_venue, staff.user_id)?;
    let show = Show::insert(&new_show, &state.db).await?;

    tracing::info!(show_id = %show.id, date = %show.show_date, by = %staff.user_id, "Show created");
    Ok(created(show, "Show created"))
}

pub async fn update_show(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ShowRequest>,
) -> Result<Response, AppError> {
    let update = body.into_update()?;
    if update.is_empty() {
        return Err(AppError::ValidationError("No valid fields to update".to_string()));
    }

    let show = Show::update(id, &update, &state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Show not found".to_string()))?;

    tracing::info!(show_id = %show.id, status = %show.status, by = %staff.user_id, "Show updated");
    Ok(success(show, "Show updated"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, date: &str, time: &str) -> ShowRequest {
        ShowRequest {
            show_name: Some(name.to_string()),
            show_date: Some(date.to_string()),
            start_time: Some(time.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_show_defaults() {
        let show = request("Late Show", "2026-11-07", "21:30")
            .into_new_show("Kings Court Boston", Uuid::nil())
            .unwrap();

        assert_eq!(show.venue, "Kings Court Boston");
        assert_eq!(show.capacity_slots, DEFAULT_CAPACITY_SLOTS);
        assert_eq!(show.start_time, NaiveTime::from_hms_opt(21, 30, 0).unwrap());
    }

    #[test]
    fn test_new_show_requires_name_date_time() {
        let result = request("  ", "2026-11-07", "21:30").into_new_show("V", Uuid::nil());
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        let result = request("Late Show", "11/07/2026", "21:30").into_new_show("V", Uuid::nil());
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_capacity_must_be_positive() {
        let mut body = request("Late Show", "2026-11-07", "21:30:00");
        body.capacity_slots = Some(0);
        assert!(body.into_new_show("V", Uuid::nil()).is_err());
    }

    #[test]
    fn test_update_parses_status_and_skips_absent_fields() {
        let update = ShowRequest {
            status: Some("closed".to_string()),
            ..Default::default()
        }
        .into_update()
        .unwrap();
        assert_eq!(update.status, Some(ShowStatus::Closed));
        assert!(update.show_date.is_none());

        let bad = ShowRequest {
            status: Some("postponed".to_string()),
            ..Default::default()
        }
        .into_update();
        assert!(bad.is_err());
    }
}
