use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::models::comedian::{ComedianStatus, ComedianSummary};
use crate::models::show::ShowStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Requested,
    Waitlisted,
    Approved,
    Rejected,
    Canceled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Requested => "requested",
            BookingStatus::Waitlisted => "waitlisted",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Canceled => "canceled",
        }
    }

    /// Staff decisions that stamp the reviewer and review time.
    pub fn is_review_decision(&self) -> bool {
        matches!(
            self,
            BookingStatus::Approved | BookingStatus::Rejected | BookingStatus::Waitlisted
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requested" => Ok(BookingStatus::Requested),
            "waitlisted" => Ok(BookingStatus::Waitlisted),
            "approved" => Ok(BookingStatus::Approved),
            "rejected" => Ok(BookingStatus::Rejected),
            "canceled" => Ok(BookingStatus::Canceled),
            other => Err(format!("Unknown request status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookingRequest {
    pub id: Uuid,
    pub show_id: Uuid,
    pub comedian_id: Uuid,
    pub requested_set_length: Option<i32>,
    pub message: String,
    pub status: BookingStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBookingRequest {
    pub show_id: Uuid,
    pub comedian_id: Uuid,
    pub requested_set_length: Option<i32>,
    pub message: String,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowBrief {
    pub id: Uuid,
    pub show_name: String,
    pub show_date: NaiveDate,
    pub start_time: NaiveTime,
    pub status: ShowStatus,
}

/// A request with its comedian and show, for the review queue and "my bookings".
#[derive(Debug, Clone, Serialize)]
pub struct BookingRequestDetail {
    #[serde(flatten)]
    pub request: BookingRequest,
    pub comedian: ComedianSummary,
    pub show: ShowBrief,
}

#[derive(FromRow)]
struct BookingRequestRow {
    #[sqlx(flatten)]
    request: BookingRequest,
    comedian_display_name: String,
    comedian_email: String,
    comedian_instagram: Option<String>,
    comedian_city: Option<String>,
    comedian_state: Option<String>,
    comedian_status: ComedianStatus,
    show_name: String,
    show_date: NaiveDate,
    show_start_time: NaiveTime,
    show_status: ShowStatus,
}

impl From<BookingRequestRow> for BookingRequestDetail {
    fn from(row: BookingRequestRow) -> Self {
        let comedian = ComedianSummary {
            id: row.request.comedian_id,
            display_name: row.comedian_display_name,
            email: row.comedian_email,
            instagram: row.comedian_instagram,
            city: row.comedian_city,
            state: row.comedian_state,
            status: Some(row.comedian_status),
        };
        let show = ShowBrief {
            id: row.request.show_id,
            show_name: row.show_name,
            show_date: row.show_date,
            start_time: row.show_start_time,
            status: row.show_status,
        };
        Self {
            request: row.request,
            comedian,
            show,
        }
    }
}

impl BookingRequest {
    pub async fn insert<'e>(
        new: &NewBookingRequest,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO booking_requests (show_id, comedian_id, requested_set_length, message, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(new.show_id)
        .bind(new.comedian_id)
        .bind(new.requested_set_length)
        .bind(&new.message)
        .bind(new.status)
        .fetch_one(executor)
        .await
    }

    /// Locks the row for the rest of the transaction.
    pub async fn find_for_update<'e>(
        id: Uuid,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM booking_requests WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn count_approved<'e>(
        show_id: Uuid,
        executor: impl PgExecutor<'e>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM booking_requests WHERE show_id = $1 AND status = 'approved'",
        )
        .bind(show_id)
        .fetch_one(executor)
        .await
    }

    /// Newest first, optionally narrowed to a show and/or a comedian.
    pub async fn list_detailed<'e>(
        show_id: Option<Uuid>,
        comedian_id: Option<Uuid>,
        executor: impl PgExecutor<'e>,
    ) -> Result<Vec<BookingRequestDetail>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BookingRequestRow>(
            "SELECT r.*,
                    c.display_name AS comedian_display_name,
                    c.email AS comedian_email,
                    c.instagram AS comedian_instagram,
                    c.city AS comedian_city,
                    c.state AS comedian_state,
                    c.status AS comedian_status,
                    s.show_name AS show_name,
                    s.show_date AS show_date,
                    s.start_time AS show_start_time,
                    s.status AS show_status
             FROM booking_requests r
             JOIN comedians c ON c.id = r.comedian_id
             JOIN shows s ON s.id = r.show_id
             WHERE ($1::uuid IS NULL OR r.show_id = $1)
               AND ($2::uuid IS NULL OR r.comedian_id = $2)
             ORDER BY r.created_at DESC",
        )
        .bind(show_id)
        .bind(comedian_id)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(BookingRequestDetail::from).collect())
    }

    /// Sets the status, stamping `reviewer` and the review time when given.
    pub async fn update_status<'e>(
        id: Uuid,
        status: BookingStatus,
        reviewer: Option<Uuid>,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE booking_requests
             SET status = $2,
                 reviewed_by = COALESCE($3, reviewed_by),
                 reviewed_at = CASE WHEN $3::uuid IS NULL THEN reviewed_at ELSE NOW() END,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(reviewer)
        .fetch_one(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_decisions() {
        assert!(BookingStatus::Approved.is_review_decision());
        assert!(BookingStatus::Rejected.is_review_decision());
        assert!(BookingStatus::Waitlisted.is_review_decision());
        assert!(!BookingStatus::Canceled.is_review_decision());
        assert!(!BookingStatus::Requested.is_review_decision());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("canceled".parse(), Ok(BookingStatus::Canceled));
        // Members use the British spelling; requests do not.
        assert!("cancelled".parse::<BookingStatus>().is_err());
    }
}
