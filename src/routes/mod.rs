use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    auth, checkin, comedians, health_check, lineup, members, pages, requests, shows,
};
use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Membership
        .route("/join", post(members::join))
        .route("/unsubscribe", post(members::unsubscribe))
        .route("/members", get(members::list_members))
        .route("/members/export", get(members::export_members))
        .route("/members/search", get(members::search_members))
        .route("/members/:id", patch(members::update_member))
        .route("/members/:id/rotate-token", post(members::rotate_token))
        // Door
        .route("/scan/m/:token", get(checkin::scan_member))
        .route("/checkin", post(checkin::check_in))
        // Comedians, also reachable as artists
        .route("/comedians/signup", post(comedians::signup))
        .route("/artists/signup", post(comedians::signup))
        .route(
            "/comedians/me",
            get(comedians::get_me).patch(comedians::update_me),
        )
        .route(
            "/artists/me",
            get(comedians::get_me).patch(comedians::update_me),
        )
        .route("/comedians", get(comedians::list_comedians))
        .route("/comedians/:id/status", patch(comedians::set_status))
        // Booking
        .route("/shows", get(shows::list_shows).post(shows::create_show))
        .route("/shows/:id", patch(shows::update_show))
        .route(
            "/requests",
            get(requests::list_requests).post(requests::create_request),
        )
        .route("/requests/:id", patch(requests::update_request))
        .route(
            "/lineup",
            get(lineup::get_lineup)
                .patch(lineup::update_lineup)
                .delete(lineup::delete_entry),
        )
        .route("/lineup/:id/move", post(lineup::move_entry))
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/m/:token", get(pages::membership_card))
        .route("/door", get(pages::door_page))
        .route("/scan", get(pages::scan_page))
        .route("/scan/m/:token", get(pages::scan_page))
        .route("/login", get(pages::login_page))
        .route("/join", get(pages::join_page))
        .route("/comedians/join", get(pages::comedian_join_page))
        .route("/comedians/profile", get(pages::comedian_profile_page))
        .route("/comedians/bookings", get(pages::comedian_bookings_page))
        .route("/admin/shows", get(pages::admin_shows_page))
        .route("/admin/shows/:id", get(pages::admin_show_page))
        .route("/admin/artists", get(pages::admin_artists_page))
        .route("/assets/*path", get(pages::asset))
}

pub fn create_routes(state: AppState) -> Router {
    let cors = create_cors_layer(&state.config.base_url);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .merge(page_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(cors)
}
