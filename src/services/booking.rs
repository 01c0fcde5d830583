//! Booking-request lifecycle: requested/waitlisted on submission, then staff
//! review, with the show lineup kept in step with the request status.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::booking_request::NewBookingRequest;
use crate::models::lineup::DEFAULT_SET_LENGTH_MINUTES;
use crate::models::{
    BookingRequest, BookingStatus, Comedian, ComedianStatus, LineupEntry, Show, ShowStatus,
};
use crate::services::lineup_order;
use crate::utils::error::{AppError, AppResult};

/// What a status change does to the show lineup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineupEffect {
    Add,
    Remove,
    Unchanged,
}

pub fn lineup_effect(status: BookingStatus) -> LineupEffect {
    match status {
        BookingStatus::Approved => LineupEffect::Add,
        BookingStatus::Rejected | BookingStatus::Canceled => LineupEffect::Remove,
        BookingStatus::Requested | BookingStatus::Waitlisted => LineupEffect::Unchanged,
    }
}

/// New requests go on the waitlist once approvals fill the show.
pub fn initial_status(approved_count: i64, capacity_slots: i32) -> BookingStatus {
    if approved_count >= i64::from(capacity_slots) {
        BookingStatus::Waitlisted
    } else {
        BookingStatus::Requested
    }
}

pub fn ensure_show_accepts_requests(show: &Show) -> AppResult<()> {
    match show.status {
        ShowStatus::Scheduled => Ok(()),
        ShowStatus::Canceled => Err(AppError::ValidationError(
            "This show has been canceled".to_string(),
        )),
        ShowStatus::Closed => Err(AppError::ValidationError(
            "This show is no longer accepting requests".to_string(),
        )),
    }
}

/// Staff may set any status; the requesting comedian may only cancel.
pub fn authorize_status_change(
    is_staff: bool,
    is_owner: bool,
    status: BookingStatus,
) -> AppResult<()> {
    if is_staff {
        return Ok(());
    }
    if is_owner {
        return if status == BookingStatus::Canceled {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You can only cancel your own requests".to_string(),
            ))
        };
    }
    Err(AppError::Forbidden("Staff access required".to_string()))
}

#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub show_id: Uuid,
    pub requested_set_length: Option<i32>,
    pub message: String,
}

/// Files a request for the caller's approved comedian profile.
pub async fn submit(
    pool: &PgPool,
    caller: &AuthUser,
    input: SubmitRequest,
) -> AppResult<BookingRequest> {
    let comedian = Comedian::find_by_auth_id(caller.user_id, pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist profile not found".to_string()))?;

    if comedian.status != ComedianStatus::Approved {
        return Err(AppError::Forbidden(
            "Your account must be approved before requesting spots".to_string(),
        ));
    }

    let show = Show::find_by_id(input.show_id, pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Show not found".to_string()))?;
    ensure_show_accepts_requests(&show)?;

    let approved = BookingRequest::count_approved(show.id, pool).await?;
    let status = initial_status(approved, show.capacity_slots);

    let request = BookingRequest::insert(
        &NewBookingRequest {
            show_id: show.id,
            comedian_id: comedian.id,
            requested_set_length: input.requested_set_length,
            message: input.message,
            status,
        },
        pool,
    )
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "You already have a request for this show"))?;

    tracing::info!(
        request_id = %request.id,
        show_id = %show.id,
        comedian_id = %comedian.id,
        status = %request.status,
        "Booking request submitted"
    );
    Ok(request)
}

/// Applies a status change and the matching lineup change in one transaction.
pub async fn change_status(
    pool: &PgPool,
    actor: &AuthUser,
    request_id: Uuid,
    status: BookingStatus,
) -> AppResult<BookingRequest> {
    let mut tx = pool.begin().await?;

    let existing = BookingRequest::find_for_update(request_id, &mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

    let owner_auth_id = Comedian::find_by_id(existing.comedian_id, &mut *tx)
        .await?
        .map(|c| c.auth_id);
    let is_owner = owner_auth_id == Some(actor.user_id);
    authorize_status_change(actor.is_staff(), is_owner, status)?;

    let reviewer = status.is_review_decision().then_some(actor.user_id);
    let updated = BookingRequest::update_status(request_id, status, reviewer, &mut *tx).await?;

    match lineup_effect(status) {
        LineupEffect::Add => {
            let max_slot = LineupEntry::max_slot(existing.show_id, &mut *tx).await?;
            let entry = LineupEntry::upsert(
                existing.show_id,
                existing.comedian_id,
                lineup_order::next_slot(max_slot),
                existing
                    .requested_set_length
                    .unwrap_or(DEFAULT_SET_LENGTH_MINUTES),
                &mut *tx,
            )
            .await?;
            tracing::info!(show_id = %entry.show_id, slot = entry.slot_order, "Lineup entry added");
        }
        LineupEffect::Remove => {
            let removed =
                LineupEntry::delete_for_comedian(existing.show_id, existing.comedian_id, &mut *tx)
                    .await?;
            if removed {
                LineupEntry::compact(existing.show_id, &mut tx).await?;
                tracing::info!(show_id = %existing.show_id, "Lineup entry removed");
            }
        }
        LineupEffect::Unchanged => {}
    }

    tx.commit().await?;

    tracing::info!(
        request_id = %updated.id,
        from = %existing.status,
        to = %updated.status,
        actor = %actor.user_id,
        "Booking request status changed"
    );
    Ok(updated)
}
