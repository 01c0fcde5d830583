use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

pub const DEFAULT_CAPACITY_SLOTS: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "show_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShowStatus {
    Scheduled,
    Closed,
    Canceled,
}

impl ShowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShowStatus::Scheduled => "scheduled",
            ShowStatus::Closed => "closed",
            ShowStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for ShowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(ShowStatus::Scheduled),
            "closed" => Ok(ShowStatus::Closed),
            "canceled" => Ok(ShowStatus::Canceled),
            other => Err(format!("Unknown show status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Show {
    pub id: Uuid,
    pub show_name: String,
    pub show_date: NaiveDate,
    pub start_time: NaiveTime,
    pub venue: String,
    pub capacity_slots: i32,
    pub notes: String,
    pub eventbrite_url: String,
    pub status: ShowStatus,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A show with its lineup and request counts, as listed on the dashboards.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShowSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub show: Show,
    pub lineup_count: i64,
    pub request_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewShow {
    pub show_name: String,
    pub show_date: NaiveDate,
    pub start_time: NaiveTime,
    pub venue: String,
    pub capacity_slots: i32,
    pub notes: String,
    pub eventbrite_url: String,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct ShowUpdate {
    pub show_name: Option<String>,
    pub show_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub venue: Option<String>,
    pub capacity_slots: Option<i32>,
    pub notes: Option<String>,
    pub eventbrite_url: Option<String>,
    pub status: Option<ShowStatus>,
}

impl ShowUpdate {
    pub fn is_empty(&self) -> bool {
        self.show_name.is_none()
            && self.show_date.is_none()
            && self.start_time.is_none()
            && self.venue.is_none()
            && self.capacity_slots.is_none()
            && self.notes.is_none()
            && self.eventbrite_url.is_none()
            && self.status.is_none()
    }
}

impl Show {
    pub async fn insert<'e>(new: &NewShow, executor: impl PgExecutor<'e>) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO shows (show_name, show_date, start_time, venue, capacity_slots, notes, eventbrite_url, created_by, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'scheduled')
             RETURNING *",
        )
        .bind(&new.show_name)
        .bind(new.show_date)
        .bind(new.start_time)
        .bind(&new.venue)
        .bind(new.capacity_slots)
        .bind(&new.notes)
        .bind(&new.eventbrite_url)
        .bind(new.created_by)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        id: Uuid,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM shows WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Ordered by date then start time. With `upcoming_from`, only shows on or
    /// after that date that have not been canceled.
    pub async fn list_with_counts<'e>(
        upcoming_from: Option<NaiveDate>,
        executor: impl PgExecutor<'e>,
    ) -> Result<Vec<ShowSummary>, sqlx::Error> {
        sqlx::query_as::<_, ShowSummary>(
            "SELECT s.*,
                    (SELECT COUNT(*) FROM show_lineup l WHERE l.show_id = s.id) AS lineup_count,
                    (SELECT COUNT(*) FROM booking_requests r WHERE r.show_id = s.id) AS request_count
             FROM shows s
             WHERE $1::date IS NULL OR (s.show_date >= $1 AND s.status <> 'canceled')
             ORDER BY s.show_date ASC, s.start_time ASC",
        )
        .bind(upcoming_from)
        .fetch_all(executor)
        .await
    }

    pub async fn update<'e>(
        id: Uuid,
        update: &ShowUpdate,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE shows
             SET show_name = COALESCE($2, show_name),
                 show_date = COALESCE($3, show_date),
                 start_time = COALESCE($4, start_time),
                 venue = COALESCE($5, venue),
                 capacity_slots = COALESCE($6, capacity_slots),
                 notes = COALESCE($7, notes),
                 eventbrite_url = COALESCE($8, eventbrite_url),
                 status = COALESCE($9, status),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&update.show_name)
        .bind(update.show_date)
        .bind(update.start_time)
        .bind(&update.venue)
        .bind(update.capacity_slots)
        .bind(&update.notes)
        .bind(&update.eventbrite_url)
        .bind(update.status)
        .fetch_optional(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_update_emptiness() {
        assert!(ShowUpdate::default().is_empty());
        let update = ShowUpdate {
            status: Some(ShowStatus::Closed),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_show_status_parses_lowercase_only_known_values() {
        assert_eq!("closed".parse::<ShowStatus>(), Ok(ShowStatus::Closed));
        assert!("postponed".parse::<ShowStatus>().is_err());
    }
}
