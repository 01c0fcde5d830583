use axum::{extract::State, response::Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{AuthUser, StaffUser};
use crate::models::lineup::LineupEntryUpdate;
use crate::models::LineupEntry;
use crate::services::lineup_order::{self, MoveDirection};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::{ApiJson, ApiPath, ApiQuery};
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct ShowQuery {
    pub show_id: Option<Uuid>,
}

pub async fn get_lineup(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<ShowQuery>,
) -> Result<Response, AppError> {
    let show_id = query
        .show_id
        .ok_or_else(|| AppError::ValidationError("show_id is required".to_string()))?;

    let lineup = LineupEntry::list_for_show(show_id, &state.db).await?;
    Ok(success(lineup, "Lineup retrieved"))
}

#[derive(Debug, Deserialize)]
pub struct LineupPatch {
    pub lineup: Option<Vec<LineupEntryUpdate>>,
}

pub async fn update_lineup(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    ApiJson(body): ApiJson<LineupPatch>,
) -> Result<Response, AppError> {
    let updates = body
        .lineup
        .ok_or_else(|| AppError::ValidationError("lineup must be an array".to_string()))?;

    let mut tx = state.db.begin().await?;
    let mut updated = Vec::with_capacity(updates.len());
    for update in updates.iter().filter(|u| u.has_changes()) {
        if let Some(entry) = LineupEntry::apply_update(update, &mut *tx).await? {
            updated.push(entry);
        }
    }
    tx.commit().await?;

    tracing::info!(entries = updated.len(), by = %staff.user_id, "Lineup updated");
    Ok(success(updated, "Lineup updated"))
}

#[derive(Debug, Deserialize)]
pub struct MoveBody {
    pub direction: Option<MoveDirection>,
}

pub async fn move_entry(
    State(state): State<AppState>,
    _staff: StaffUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<MoveBody>,
) -> Result<Response, AppError> {
    let direction = body
        .direction
        .ok_or_else(|| AppError::ValidationError("direction must be up or down".to_string()))?;

    let mut tx = state.db.begin().await?;
    let entry = LineupEntry::find_by_id(id, &mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Lineup entry not found".to_string()))?;

    let ordered = LineupEntry::ordered_ids(entry.show_id, &mut *tx).await?;
    let reordered = lineup_order::move_entry(&ordered, id, direction)
        .ok_or_else(|| AppError::NotFound("Lineup entry not found".to_string()))?;
    LineupEntry::set_slots(&lineup_order::renumber(&reordered), &mut *tx).await?;

    let lineup = LineupEntry::list_for_show(entry.show_id, &mut *tx).await?;
    tx.commit().await?;

    Ok(success(lineup, "Lineup reordered"))
}

#[derive(Debug, Deserialize)]
pub struct EntryQuery {
    pub id: Option<Uuid>,
}

pub async fn delete_entry(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    ApiQuery(query): ApiQuery<EntryQuery>,
) -> Result<Response, AppError> {
    let id = query
        .id
        .ok_or_else(|| AppError::ValidationError("id is required".to_string()))?;

    let mut tx = state.db.begin().await?;
    let removed = LineupEntry::delete_by_id(id, &mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Lineup entry not found".to_string()))?;
    LineupEntry::compact(removed.show_id, &mut tx).await?;
    tx.commit().await?;

    tracing::info!(show_id = %removed.show_id, entry_id = %removed.id, by = %staff.user_id, "Lineup entry removed");
    Ok(success(removed, "Lineup entry removed"))
}
