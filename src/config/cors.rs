use axum::http::{header, HeaderValue, Method};
use std::env;
use tower_http::cors::{AllowOrigin, CorsLayer};

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

/// Cross-origin access for the JSON API. The public base URL is always
/// allowed; `CORS_ALLOWED_ORIGINS` adds more (comma separated).
pub fn create_cors_layer(base_url: &str) -> CorsLayer {
    let extra = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parse_origins(base_url, &extra)))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(PREFLIGHT_MAX_AGE_SECS))
}

fn parse_origins(base_url: &str, extra: &str) -> Vec<HeaderValue> {
    let mut origins: Vec<HeaderValue> = Vec::new();

    for candidate in std::iter::once(base_url).chain(extra.split(',')) {
        let trimmed = candidate.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.parse::<HeaderValue>() {
            Ok(value) if !origins.contains(&value) => {
                tracing::debug!("CORS: Allowing origin: {}", trimmed);
                origins.push(value);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e),
        }
    }

    tracing::info!("CORS: Configured with {} allowed origin(s)", origins.len());
    origins
}
