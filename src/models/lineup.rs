use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, PgConnection, PgExecutor};
use uuid::Uuid;

use crate::models::comedian::ComedianSummary;
use crate::services::lineup_order;

pub const DEFAULT_SET_LENGTH_MINUTES: i32 = 10;
pub const DEFAULT_ROLE: &str = "performer";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LineupEntry {
    pub id: Uuid,
    pub show_id: Uuid,
    pub comedian_id: Uuid,
    pub slot_order: i32,
    pub set_length_minutes: i32,
    pub role: String,
    pub internal_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineupEntryDetail {
    #[serde(flatten)]
    pub entry: LineupEntry,
    pub comedian: ComedianSummary,
}

#[derive(FromRow)]
struct LineupRow {
    #[sqlx(flatten)]
    entry: LineupEntry,
    comedian_display_name: String,
    comedian_email: String,
    comedian_instagram: Option<String>,
    comedian_city: Option<String>,
    comedian_state: Option<String>,
}

impl From<LineupRow> for LineupEntryDetail {
    fn from(row: LineupRow) -> Self {
        let comedian = ComedianSummary {
            id: row.entry.comedian_id,
            display_name: row.comedian_display_name,
            email: row.comedian_email,
            instagram: row.comedian_instagram,
            city: row.comedian_city,
            state: row.comedian_state,
            status: None,
        };
        Self {
            entry: row.entry,
            comedian,
        }
    }
}

/// Staff edit of one slot. `None` leaves the column unchanged. For
/// `internal_notes`, an explicit `null` clears the notes.
#[derive(Debug, Clone, Deserialize)]
pub struct LineupEntryUpdate {
    pub id: Uuid,
    pub slot_order: Option<i32>,
    pub set_length_minutes: Option<i32>,
    pub role: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub internal_notes: Option<Option<String>>,
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl LineupEntryUpdate {
    pub fn has_changes(&self) -> bool {
        self.slot_order.is_some()
            || self.set_length_minutes.is_some()
            || self.role.is_some()
            || self.internal_notes.is_some()
    }
}

impl LineupEntry {
    pub async fn list_for_show<'e>(
        show_id: Uuid,
        executor: impl PgExecutor<'e>,
    ) -> Result<Vec<LineupEntryDetail>, sqlx::Error> {
        let rows = sqlx::query_as::<_, LineupRow>(
            "SELECT l.*,
                    c.display_name AS comedian_display_name,
                    c.email AS comedian_email,
                    c.instagram AS comedian_instagram,
                    c.city AS comedian_city,
                    c.state AS comedian_state
             FROM show_lineup l
             JOIN comedians c ON c.id = l.comedian_id
             WHERE l.show_id = $1
             ORDER BY l.slot_order ASC, l.created_at ASC",
        )
        .bind(show_id)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(LineupEntryDetail::from).collect())
    }

    /// Entry ids of a show in running order.
    pub async fn ordered_ids<'e>(
        show_id: Uuid,
        executor: impl PgExecutor<'e>,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM show_lineup WHERE show_id = $1 ORDER BY slot_order ASC, created_at ASC",
        )
        .bind(show_id)
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        id: Uuid,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM show_lineup WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Appends the comedian at `slot_order`. An existing entry for the same
    /// comedian keeps its slot and settings.
    pub async fn upsert<'e>(
        show_id: Uuid,
        comedian_id: Uuid,
        slot_order: i32,
        set_length_minutes: i32,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO show_lineup (show_id, comedian_id, slot_order, set_length_minutes, role)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (show_id, comedian_id) DO UPDATE SET updated_at = NOW()
             RETURNING *",
        )
        .bind(show_id)
        .bind(comedian_id)
        .bind(slot_order)
        .bind(set_length_minutes)
        .bind(DEFAULT_ROLE)
        .fetch_one(executor)
        .await
    }

    pub async fn max_slot<'e>(
        show_id: Uuid,
        executor: impl PgExecutor<'e>,
    ) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar("SELECT COALESCE(MAX(slot_order), 0) FROM show_lineup WHERE show_id = $1")
            .bind(show_id)
            .fetch_one(executor)
            .await
    }

    /// Returns whether an entry was removed.
    pub async fn delete_for_comedian<'e>(
        show_id: Uuid,
        comedian_id: Uuid,
        executor: impl PgExecutor<'e>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM show_lineup WHERE show_id = $1 AND comedian_id = $2")
            .bind(show_id)
            .bind(comedian_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_by_id<'e>(
        id: Uuid,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("DELETE FROM show_lineup WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn apply_update<'e>(
        update: &LineupEntryUpdate,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE show_lineup
             SET slot_order = COALESCE($2, slot_order),
                 set_length_minutes = COALESCE($3, set_length_minutes),
                 role = COALESCE($4, role),
                 internal_notes = CASE WHEN $5 THEN $6 ELSE internal_notes END,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(update.id)
        .bind(update.slot_order)
        .bind(update.set_length_minutes)
        .bind(&update.role)
        .bind(update.internal_notes.is_some())
        .bind(update.internal_notes.clone().flatten())
        .fetch_optional(executor)
        .await
    }

    /// Writes `(entry id, slot)` pairs in one statement.
    pub async fn set_slots<'e>(
        slots: &[(Uuid, i32)],
        executor: impl PgExecutor<'e>,
    ) -> Result<(), sqlx::Error> {
        if slots.is_empty() {
            return Ok(());
        }
        let (ids, orders): (Vec<Uuid>, Vec<i32>) = slots.iter().copied().unzip();
        sqlx::query(
            "UPDATE show_lineup l
             SET slot_order = v.slot_order, updated_at = NOW()
             FROM UNNEST($1::uuid[], $2::int4[]) AS v(id, slot_order)
             WHERE l.id = v.id AND l.slot_order <> v.slot_order",
        )
        .bind(&ids)
        .bind(&orders)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Closes gaps so the show's slots run 1..=n in their current order.
    pub async fn compact(show_id: Uuid, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        let ids = Self::ordered_ids(show_id, &mut *conn).await?;
        Self::set_slots(&lineup_order::renumber(&ids), &mut *conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_without_fields_has_no_changes() {
        let update: LineupEntryUpdate =
            serde_json::from_str(r#"{"id": "6f1c1a3e-6a7e-4c44-9d0e-0f3f7e0c2b11"}"#).unwrap();
        assert!(!update.has_changes());

        let update: LineupEntryUpdate = serde_json::from_str(
            r#"{"id": "6f1c1a3e-6a7e-4c44-9d0e-0f3f7e0c2b11", "role": "host"}"#,
        )
        .unwrap();
        assert!(update.has_changes());
    }

    #[test]
    fn test_null_notes_clear_while_absent_notes_keep() {
        let cleared: LineupEntryUpdate = serde_json::from_str(
            r#"{"id": "6f1c1a3e-6a7e-4c44-9d0e-0f3f7e0c2b11", "internal_notes": null}"#,
        )
        .unwrap();
        assert_eq!(cleared.internal_notes, Some(None));
        assert!(cleared.has_changes());

        let kept: LineupEntryUpdate =
            serde_json::from_str(r#"{"id": "6f1c1a3e-6a7e-4c44-9d0e-0f3f7e0c2b11"}"#).unwrap();
        assert_eq!(kept.internal_notes, None);

        let set: LineupEntryUpdate = serde_json::from_str(
            r#"{"id": "6f1c1a3e-6a7e-4c44-9d0e-0f3f7e0c2b11", "internal_notes": "opener"}"#,
        )
        .unwrap();
        assert_eq!(set.internal_notes, Some(Some("opener".to_string())));
    }
}
