use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod auth;
pub mod checkin;
pub mod comedians;
pub mod lineup;
pub mod members;
pub mod pages;
pub mod requests;
pub mod shows;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "venue-api",
    };

    success(payload, "Health check successful")
}
