use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use rust_embed::RustEmbed;

use crate::models::{Member, MemberStatus};
use crate::services::email::html_escape;
use crate::services::qr;
use crate::state::AppState;
use crate::utils::extract::ApiPath;

/// Static pages with their script and stylesheet. Each page loads its data
/// from the JSON API after it renders.
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct PageAssets;

fn serve_asset(path: &str) -> Response {
    match PageAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

pub async fn door_page() -> Response {
    serve_asset("door.html")
}

/// Serves the scanner for both `/scan` and `/scan/m/{token}`; the page reads
/// the token from its own URL.
pub async fn scan_page() -> Response {
    serve_asset("scan.html")
}

pub async fn login_page() -> Response {
    serve_asset("login.html")
}

pub async fn join_page() -> Response {
    serve_asset("join.html")
}

pub async fn comedian_join_page() -> Response {
    serve_asset("comedian-join.html")
}

pub async fn comedian_profile_page() -> Response {
    serve_asset("comedian-profile.html")
}

pub async fn comedian_bookings_page() -> Response {
    serve_asset("comedian-bookings.html")
}

pub async fn admin_shows_page() -> Response {
    serve_asset("admin-shows.html")
}

/// Serves `/admin/shows/{id}`; the page reads the show id from its URL.
pub async fn admin_show_page() -> Response {
    serve_asset("admin-show.html")
}

pub async fn admin_artists_page() -> Response {
    serve_asset("admin-artists.html")
}

pub async fn asset(ApiPath(path): ApiPath<String>) -> Response {
    serve_asset(&path)
}

fn status_badge(status: MemberStatus) -> (&'static str, &'static str) {
    if status.admits_checkin() {
        ("badge badge-ok", "Active")
    } else {
        ("badge badge-bad", status.as_str())
    }
}

fn render_card(venue_name: &str, member: &Member, qr_svg: &str) -> String {
    let (badge_class, badge_label) = status_badge(member.status);
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{venue} Membership</title>
  <link rel="stylesheet" href="/assets/style.css">
</head>
<body class="card-page">
  <main class="card">
    <h1>{venue}</h1>
    <p class="card-name">{first} {last}</p>
    <p class="{badge_class}">{badge_label}</p>
    <div class="card-qr">{qr_svg}</div>
    <p class="muted">Show this code at the door.</p>
  </main>
</body>
</html>"#,
        venue = html_escape(venue_name),
        first = html_escape(&member.first_name),
        last = html_escape(&member.last_name),
        badge_class = badge_class,
        badge_label = html_escape(badge_label),
        qr_svg = qr_svg,
    )
}

fn not_found_page() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(
            r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Card not found</title><link rel="stylesheet" href="/assets/style.css"></head>
<body class="card-page"><main class="card"><h1>Card not found</h1><p class="muted">This membership link is no longer valid.</p></main></body>
</html>"#,
        ),
    )
        .into_response()
}

/// The member's digital card at `/m/{token}`.
pub async fn membership_card(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<String>,
) -> Response {
    let member = match Member::find_by_token(&token, &state.db).await {
        Ok(Some(member)) => member,
        Ok(None) => return not_found_page(),
        Err(e) => {
            tracing::error!(error = ?e, "Membership card lookup failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response();
        }
    };

    match qr::render_svg(&state.config.scan_url(&member.membership_token)) {
        Ok(svg) => Html(render_card(&state.config.venue_name, &member, &svg)).into_response(),
        Err(e) => {
            tracing::error!(member_id = %member.id, error = ?e, "QR code rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
        }
    }
}
