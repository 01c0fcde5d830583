//! Rows created straight through the models. Emails carry a fresh uuid so
//! tests sharing the database never collide.

use chrono::{Duration, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use venue_server::models::comedian::NewComedian;
use venue_server::models::member::NewMember;
use venue_server::models::show::NewShow;
use venue_server::models::{
    Comedian, ComedianStatus, Member, MemberStatus, Show, User, UserRole,
};

fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
}

pub async fn create_user(pool: &PgPool, role: UserRole) -> User {
    User::create(&unique_email(role.as_str()), "not-a-real-hash", role, pool)
        .await
        .expect("Failed to create user")
}

pub async fn create_staff(pool: &PgPool) -> User {
    create_user(pool, UserRole::Staff).await
}

/// An artist login with a comedian profile in `status`.
pub async fn create_comedian(
    pool: &PgPool,
    display_name: &str,
    status: ComedianStatus,
) -> (User, Comedian) {
    let user = create_user(pool, UserRole::Artist).await;
    let comedian = Comedian::insert(
        &NewComedian {
            auth_id: user.id,
            display_name: display_name.to_string(),
            email: user.email.clone(),
            phone: None,
            city: Some("Boston".to_string()),
            state: Some("MA".to_string()),
            bio: String::new(),
            instagram: None,
        },
        pool,
    )
    .await
    .expect("Failed to create comedian");

    let comedian = Comedian::set_status(comedian.id, status, pool)
        .await
        .expect("Failed to set comedian status")
        .expect("comedian exists");
    (user, comedian)
}

pub async fn create_show(pool: &PgPool, created_by: &User, capacity_slots: i32) -> Show {
    Show::insert(
        &NewShow {
            show_name: "Tuesday Open Mic".to_string(),
            show_date: (Utc::now() + Duration::days(7)).date_naive(),
            start_time: NaiveTime::from_hms_opt(20, 0, 0).expect("valid time"),
            venue: "Kings Court Boston".to_string(),
            capacity_slots,
            notes: String::new(),
            eventbrite_url: String::new(),
            created_by: created_by.id,
        },
        pool,
    )
    .await
    .expect("Failed to create show")
}

pub async fn create_member(pool: &PgPool, status: MemberStatus) -> Member {
    let user = create_user(pool, UserRole::Member).await;
    let member = Member::insert(
        &NewMember {
            auth_id: user.id,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: user.email.clone(),
            phone: None,
            membership_token: Uuid::new_v4().simple().to_string(),
        },
        pool,
    )
    .await
    .expect("Failed to create member");

    if status != MemberStatus::Active {
        Member::set_status(member.id, status, pool)
            .await
            .expect("Failed to set member status");
    }
    Member { status, ..member }
}
