//! Booking, lineup and check-in flows against a real Postgres.
//!
//! Requires Docker: the harness starts a shared Postgres container.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};
use test_context::test_context;
use uuid::Uuid;

use common::{create_comedian, create_member, create_show, create_staff, json_body, TestHarness};
use venue_server::models::{ComedianStatus, MemberStatus};

/// `(display_name, slot_order)` pairs of a show's lineup in running order.
async fn lineup_of(ctx: &TestHarness, token: &str, show_id: Uuid) -> Vec<(String, i64)> {
    let response = ctx
        .app
        .request("GET", &format!("/api/lineup?show_id={}", show_id), Some(token), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    body["data"]
        .as_array()
        .expect("lineup array")
        .iter()
        .map(|entry| {
            (
                entry["comedian"]["display_name"].as_str().unwrap_or_default().to_string(),
                entry["slot_order"].as_i64().unwrap_or_default(),
            )
        })
        .collect()
}

async fn submit(ctx: &TestHarness, token: &str, show_id: Uuid) -> (StatusCode, Value) {
    let response = ctx
        .app
        .request(
            "POST",
            "/api/requests",
            Some(token),
            Some(json!({ "show_id": show_id, "requested_set_length": 7 })),
        )
        .await;
    let status = response.status();
    (status, json_body(response).await)
}

async fn set_request_status(
    ctx: &TestHarness,
    token: &str,
    request_id: &Value,
    status: &str,
) -> StatusCode {
    let request_id = request_id.as_str().expect("request id");
    ctx.app
        .request(
            "PATCH",
            &format!("/api/requests/{}", request_id),
            Some(token),
            Some(json!({ "status": status })),
        )
        .await
        .status()
}

#[test_context(TestHarness)]
#[tokio::test]
async fn approvals_append_and_cancellation_renumbers(ctx: &TestHarness) {
    let staff = create_staff(&ctx.db_pool).await;
    let staff_token = ctx.app.token_for_user(&staff);
    let show = create_show(&ctx.db_pool, &staff, 8).await;

    let mut comics = Vec::new();
    for name in ["C0", "C1", "C2"] {
        let (user, _) = create_comedian(&ctx.db_pool, name, ComedianStatus::Approved).await;
        let token = ctx.app.token_for_user(&user);
        let (status, body) = submit(ctx, &token, show.id).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "requested");
        comics.push((token, body["data"]["id"].clone()));
    }

    for (_, request_id) in &comics {
        assert_eq!(
            set_request_status(ctx, &staff_token, request_id, "approved").await,
            StatusCode::OK
        );
    }
    assert_eq!(
        lineup_of(ctx, &staff_token, show.id).await,
        vec![("C0".to_string(), 1), ("C1".to_string(), 2), ("C2".to_string(), 3)]
    );

    // Approving again keeps the existing slot.
    assert_eq!(
        set_request_status(ctx, &staff_token, &comics[1].1, "approved").await,
        StatusCode::OK
    );
    assert_eq!(lineup_of(ctx, &staff_token, show.id).await.len(), 3);

    // The owner cancels; the rest close the gap.
    let (c0_token, c0_request) = &comics[0];
    assert_eq!(
        set_request_status(ctx, c0_token, c0_request, "canceled").await,
        StatusCode::OK
    );
    assert_eq!(
        lineup_of(ctx, &staff_token, show.id).await,
        vec![("C1".to_string(), 1), ("C2".to_string(), 2)]
    );

    // A rejection removes the entry the same way.
    assert_eq!(
        set_request_status(ctx, &staff_token, &comics[2].1, "rejected").await,
        StatusCode::OK
    );
    assert_eq!(
        lineup_of(ctx, &staff_token, show.id).await,
        vec![("C1".to_string(), 1)]
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn owner_cannot_approve_own_request(ctx: &TestHarness) {
    let staff = create_staff(&ctx.db_pool).await;
    let show = create_show(&ctx.db_pool, &staff, 8).await;
    let (user, _) = create_comedian(&ctx.db_pool, "Solo", ComedianStatus::Approved).await;
    let token = ctx.app.token_for_user(&user);

    let (_, body) = submit(ctx, &token, show.id).await;
    assert_eq!(
        set_request_status(ctx, &token, &body["data"]["id"], "approved").await,
        StatusCode::FORBIDDEN
    );
    assert!(lineup_of(ctx, &token, show.id).await.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn full_show_waitlists_and_duplicates_conflict(ctx: &TestHarness) {
    let staff = create_staff(&ctx.db_pool).await;
    let staff_token = ctx.app.token_for_user(&staff);
    let show = create_show(&ctx.db_pool, &staff, 1).await;

    let (first, _) = create_comedian(&ctx.db_pool, "First", ComedianStatus::Approved).await;
    let first_token = ctx.app.token_for_user(&first);
    let (_, body) = submit(ctx, &first_token, show.id).await;
    assert_eq!(
        set_request_status(ctx, &staff_token, &body["data"]["id"], "approved").await,
        StatusCode::OK
    );

    let (second, _) = create_comedian(&ctx.db_pool, "Second", ComedianStatus::Approved).await;
    let second_token = ctx.app.token_for_user(&second);
    let (status, body) = submit(ctx, &second_token, show.id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "waitlisted");
    assert!(body["message"].as_str().unwrap_or_default().contains("waitlist"));

    let (status, _) = submit(ctx, &second_token, show.id).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn pending_comedian_cannot_request(ctx: &TestHarness) {
    let staff = create_staff(&ctx.db_pool).await;
    let show = create_show(&ctx.db_pool, &staff, 8).await;
    let (user, _) = create_comedian(&ctx.db_pool, "Newbie", ComedianStatus::Pending).await;

    let (status, _) = submit(ctx, &ctx.app.token_for_user(&user), show.id).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn move_and_delete_keep_slots_contiguous(ctx: &TestHarness) {
    let staff = create_staff(&ctx.db_pool).await;
    let staff_token = ctx.app.token_for_user(&staff);
    let show = create_show(&ctx.db_pool, &staff, 8).await;

    for name in ["A", "B", "C"] {
        let (user, _) = create_comedian(&ctx.db_pool, name, ComedianStatus::Approved).await;
        let (_, body) = submit(ctx, &ctx.app.token_for_user(&user), show.id).await;
        set_request_status(ctx, &staff_token, &body["data"]["id"], "approved").await;
    }

    let response = ctx
        .app
        .request("GET", &format!("/api/lineup?show_id={}", show.id), Some(&staff_token), None)
        .await;
    let lineup = json_body(response).await;
    let last_id = lineup["data"][2]["id"].as_str().expect("entry id").to_string();
    let first_id = lineup["data"][0]["id"].as_str().expect("entry id").to_string();

    let response = ctx
        .app
        .request(
            "POST",
            &format!("/api/lineup/{}/move", last_id),
            Some(&staff_token),
            Some(json!({ "direction": "up" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        lineup_of(ctx, &staff_token, show.id).await,
        vec![("A".to_string(), 1), ("C".to_string(), 2), ("B".to_string(), 3)]
    );

    let response = ctx
        .app
        .request("DELETE", &format!("/api/lineup?id={}", first_id), Some(&staff_token), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        lineup_of(ctx, &staff_token, show.id).await,
        vec![("C".to_string(), 1), ("B".to_string(), 2)]
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn lineup_patch_sets_and_clears_notes(ctx: &TestHarness) {
    let staff = create_staff(&ctx.db_pool).await;
    let staff_token = ctx.app.token_for_user(&staff);
    let show = create_show(&ctx.db_pool, &staff, 8).await;
    let (user, _) = create_comedian(&ctx.db_pool, "Host", ComedianStatus::Approved).await;
    let (_, body) = submit(ctx, &ctx.app.token_for_user(&user), show.id).await;
    set_request_status(ctx, &staff_token, &body["data"]["id"], "approved").await;

    let response = ctx
        .app
        .request("GET", &format!("/api/lineup?show_id={}", show.id), Some(&staff_token), None)
        .await;
    let entry = json_body(response).await["data"][0].clone();
    assert_eq!(entry["set_length_minutes"], 7);

    let response = ctx
        .app
        .request(
            "PATCH",
            "/api/lineup",
            Some(&staff_token),
            Some(json!({ "lineup": [{ "id": entry["id"], "role": "host", "internal_notes": "opens" }] })),
        )
        .await;
    let body = json_body(response).await;
    assert_eq!(body["data"][0]["role"], "host");
    assert_eq!(body["data"][0]["internal_notes"], "opens");

    let response = ctx
        .app
        .request(
            "PATCH",
            "/api/lineup",
            Some(&staff_token),
            Some(json!({ "lineup": [{ "id": entry["id"], "internal_notes": null }] })),
        )
        .await;
    let body = json_body(response).await;
    assert_eq!(body["data"][0]["role"], "host");
    assert!(body["data"][0]["internal_notes"].is_null());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn staff_without_profile_listing_mine_sees_all(ctx: &TestHarness) {
    let staff = create_staff(&ctx.db_pool).await;
    let staff_token = ctx.app.token_for_user(&staff);
    let show = create_show(&ctx.db_pool, &staff, 8).await;
    let (user, _) = create_comedian(&ctx.db_pool, "Listed", ComedianStatus::Approved).await;
    submit(ctx, &ctx.app.token_for_user(&user), show.id).await;

    let response = ctx
        .app
        .request(
            "GET",
            &format!("/api/requests?my=true&show_id={}", show.id),
            Some(&staff_token),
            None,
        )
        .await;
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn check_in_admits_active_and_refuses_suspended(ctx: &TestHarness) {
    let staff = create_staff(&ctx.db_pool).await;
    let staff_token = ctx.app.token_for_user(&staff);

    let active = create_member(&ctx.db_pool, MemberStatus::Active).await;
    let response = ctx
        .app
        .request("POST", "/api/checkin", Some(&staff_token), Some(json!({ "member_id": active.id })))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .request(
            "GET",
            &format!("/api/scan/m/{}", active.membership_token),
            Some(&staff_token),
            None,
        )
        .await;
    let body = json_body(response).await;
    assert!(!body["data"]["last_checkin"].is_null());

    let suspended = create_member(&ctx.db_pool, MemberStatus::Suspended).await;
    let response = ctx
        .app
        .request("POST", "/api/checkin", Some(&staff_token), Some(json!({ "member_id": suspended.id })))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], "Member is suspended");
}
