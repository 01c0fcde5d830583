use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Vip,
    Staff,
    Comp,
    Suspended,
    Expired,
    Cancelled,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Vip => "vip",
            MemberStatus::Staff => "staff",
            MemberStatus::Comp => "comp",
            MemberStatus::Suspended => "suspended",
            MemberStatus::Expired => "expired",
            MemberStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a member in this status is let in at the door.
    pub fn admits_checkin(&self) -> bool {
        matches!(
            self,
            MemberStatus::Active | MemberStatus::Vip | MemberStatus::Staff | MemberStatus::Comp
        )
    }

    /// Statuses staff may assign from the member admin screen.
    pub fn is_staff_assignable(&self) -> bool {
        matches!(
            self,
            MemberStatus::Active | MemberStatus::Suspended | MemberStatus::Cancelled
        )
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MemberStatus::Active),
            "vip" => Ok(MemberStatus::Vip),
            "staff" => Ok(MemberStatus::Staff),
            "comp" => Ok(MemberStatus::Comp),
            "suspended" => Ok(MemberStatus::Suspended),
            "expired" => Ok(MemberStatus::Expired),
            "cancelled" => Ok(MemberStatus::Cancelled),
            other => Err(format!("Unknown member status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: Uuid,
    pub auth_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub membership_token: String,
    pub status: MemberStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMember {
    pub auth_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub membership_token: String,
}

/// What the door sees after a scan or search hit.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MemberLookup {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: MemberStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_checkin: Option<DateTime<Utc>>,
}

const LOOKUP_COLUMNS: &str = "m.id, m.first_name, m.last_name, m.email, m.phone, m.status, m.notes, m.created_at,
     (SELECT MAX(c.created_at) FROM checkins c WHERE c.member_id = m.id) AS last_checkin";

impl Member {
    pub async fn insert<'e>(
        new: &NewMember,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO members (auth_id, first_name, last_name, email, phone, membership_token, status)
             VALUES ($1, $2, $3, $4, $5, $6, 'active')
             RETURNING *",
        )
        .bind(new.auth_id)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.membership_token)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        id: Uuid,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_token<'e>(
        token: &str,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM members WHERE membership_token = $1")
            .bind(token)
            .fetch_optional(executor)
            .await
    }

    /// Newest first.
    pub async fn list_all<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM members ORDER BY created_at DESC")
            .fetch_all(executor)
            .await
    }

    /// Applies a staff edit; `None` leaves the column unchanged.
    pub async fn update_admin_fields<'e>(
        id: Uuid,
        status: Option<MemberStatus>,
        notes: Option<&str>,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE members
             SET status = COALESCE($2, status),
                 notes = CASE WHEN $3::boolean THEN $4 ELSE notes END,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(notes.is_some())
        .bind(notes)
        .fetch_optional(executor)
        .await
    }

    pub async fn rotate_token<'e>(
        id: Uuid,
        token: &str,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE members SET membership_token = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(token)
        .fetch_optional(executor)
        .await
    }

    pub async fn set_status<'e>(
        id: Uuid,
        status: MemberStatus,
        executor: impl PgExecutor<'e>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE members SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn lookup_by_token<'e>(
        token: &str,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<MemberLookup>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM members m WHERE m.membership_token = $1",
            LOOKUP_COLUMNS
        );
        sqlx::query_as::<_, MemberLookup>(&sql)
            .bind(token)
            .fetch_optional(executor)
            .await
    }

    /// Case-insensitive match of an `ILIKE` pattern against name, email and phone.
    pub async fn search<'e>(
        pattern: &str,
        limit: i64,
        executor: impl PgExecutor<'e>,
    ) -> Result<Vec<MemberLookup>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM members m
             WHERE m.first_name ILIKE $1
                OR m.last_name ILIKE $1
                OR m.email ILIKE $1
                OR m.phone ILIKE $1
             ORDER BY m.last_name, m.first_name
             LIMIT $2",
            LOOKUP_COLUMNS
        );
        sqlx::query_as::<_, MemberLookup>(&sql)
            .bind(pattern)
            .bind(limit)
            .fetch_all(executor)
            .await
    }
}
