use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Checkin {
    pub id: Uuid,
    pub member_id: Uuid,
    pub checked_in_by: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Checkin {
    pub async fn insert<'e>(
        member_id: Uuid,
        checked_in_by: Uuid,
        notes: Option<&str>,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO checkins (member_id, checked_in_by, notes)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(member_id)
        .bind(checked_in_by)
        .bind(notes)
        .fetch_one(executor)
        .await
    }
}
