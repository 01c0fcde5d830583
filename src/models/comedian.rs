use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "comedian_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ComedianStatus {
    Pending,
    Approved,
    Banned,
}

impl ComedianStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComedianStatus::Pending => "pending",
            ComedianStatus::Approved => "approved",
            ComedianStatus::Banned => "banned",
        }
    }
}

impl fmt::Display for ComedianStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComedianStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ComedianStatus::Pending),
            "approved" => Ok(ComedianStatus::Approved),
            "banned" => Ok(ComedianStatus::Banned),
            other => Err(format!("Unknown artist status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comedian {
    pub id: Uuid,
    pub auth_id: Uuid,
    pub display_name: String,
    pub legal_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub bio: String,
    pub instagram: Option<String>,
    pub video_links: Vec<String>,
    pub tags: Vec<String>,
    pub status: ComedianStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComedian {
    pub auth_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub bio: String,
    pub instagram: Option<String>,
}

/// Self-service profile edit. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComedianProfileUpdate {
    pub display_name: Option<String>,
    pub legal_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub bio: Option<String>,
    pub instagram: Option<String>,
    pub video_links: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

impl ComedianProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.legal_name.is_none()
            && self.phone.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.bio.is_none()
            && self.instagram.is_none()
            && self.video_links.is_none()
            && self.tags.is_none()
    }
}

/// Performer fields embedded in lineup and request listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComedianSummary {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub instagram: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ComedianStatus>,
}

impl Comedian {
    pub async fn insert<'e>(
        new: &NewComedian,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO comedians (auth_id, display_name, email, phone, city, state, bio, instagram, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
             RETURNING *",
        )
        .bind(new.auth_id)
        .bind(&new.display_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.bio)
        .bind(&new.instagram)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        id: Uuid,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM comedians WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_auth_id<'e>(
        auth_id: Uuid,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM comedians WHERE auth_id = $1")
            .bind(auth_id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_email<'e>(
        email: &str,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM comedians WHERE email = $1")
            .bind(email)
            .fetch_optional(executor)
            .await
    }

    /// Newest first, optionally narrowed to one review status.
    pub async fn list<'e>(
        status: Option<ComedianStatus>,
        executor: impl PgExecutor<'e>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM comedians
             WHERE $1::comedian_status IS NULL OR status = $1
             ORDER BY created_at DESC",
        )
        .bind(status)
        .fetch_all(executor)
        .await
    }

    pub async fn update_profile<'e>(
        id: Uuid,
        update: &ComedianProfileUpdate,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE comedians
             SET display_name = COALESCE($2, display_name),
                 legal_name = COALESCE($3, legal_name),
                 phone = COALESCE($4, phone),
                 city = COALESCE($5, city),
                 state = COALESCE($6, state),
                 bio = COALESCE($7, bio),
                 instagram = COALESCE($8, instagram),
                 video_links = COALESCE($9, video_links),
                 tags = COALESCE($10, tags),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&update.display_name)
        .bind(&update.legal_name)
        .bind(&update.phone)
        .bind(&update.city)
        .bind(&update.state)
        .bind(&update.bio)
        .bind(&update.instagram)
        .bind(&update.video_links)
        .bind(&update.tags)
        .fetch_one(executor)
        .await
    }

    pub async fn set_status<'e>(
        id: Uuid,
        status: ComedianStatus,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE comedians SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_profile_update() {
        assert!(ComedianProfileUpdate::default().is_empty());

        let update = ComedianProfileUpdate {
            tags: Some(vec!["clean".to_string()]),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let update: ComedianProfileUpdate =
            serde_json::from_str(r#"{"status": "approved", "bio": "Ten years on the road"}"#)
                .unwrap();
        assert_eq!(update.bio.as_deref(), Some("Ten years on the road"));
        assert!(update.display_name.is_none());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("banned".parse::<ComedianStatus>(), Ok(ComedianStatus::Banned));
        assert!("active".parse::<ComedianStatus>().is_err());
    }
}
