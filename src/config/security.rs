use axum::http::{header, HeaderName, HeaderValue, Request, Response};
use std::{
    env,
    task::{Context, Poll},
};
use tower::{Layer, Service};

const X_XSS_PROTECTION: &str = "x-xss-protection";
const PERMISSIONS_POLICY: &str = "permissions-policy";

const NOSNIFF: &str = "nosniff";
const DENY: &str = "DENY";
const XSS_BLOCK: &str = "1; mode=block";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
const REFERRER_POLICY_VALUE: &str = "strict-origin-when-cross-origin";

/// JSON and CSV responses never load anything.
const CSP_API_VALUE: &str = "default-src 'none'; frame-ancestors 'none'";
/// Door, scan and card pages load their own embedded assets and inline QR images.
const CSP_PAGE_VALUE: &str = "default-src 'self'; img-src 'self' data:; style-src 'self' 'unsafe-inline'; frame-ancestors 'none'";
/// The scanner page needs the camera on our own origin only.
const PERMISSIONS_POLICY_VALUE: &str = "geolocation=(), microphone=(), camera=(self)";

#[derive(Clone)]
pub struct SecurityHeadersLayer {
    include_hsts: bool,
}

impl SecurityHeadersLayer {
    pub fn new(include_hsts: bool) -> Self {
        Self { include_hsts }
    }

    pub fn from_env() -> Self {
        let is_production = env::var("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);

        if is_production {
            tracing::info!("Security: HSTS header enabled (production mode)");
        } else {
            tracing::info!("Security: HSTS header disabled (development mode)");
        }

        Self::new(is_production)
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersService {
            inner,
            include_hsts: self.include_hsts,
        }
    }
}

#[derive(Clone)]
pub struct SecurityHeadersService<S> {
    inner: S,
    include_hsts: bool,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for SecurityHeadersService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = SecurityHeadersFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        SecurityHeadersFuture {
            future: self.inner.call(request),
            include_hsts: self.include_hsts,
        }
    }
}

#[pin_project::pin_project]
pub struct SecurityHeadersFuture<F> {
    #[pin]
    future: F,
    include_hsts: bool,
}

impl<F, ResBody, E> std::future::Future for SecurityHeadersFuture<F>
where
    F: std::future::Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: std::pin::Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match this.future.poll(cx) {
            Poll::Ready(Ok(mut response)) => {
                apply_security_headers(response.headers_mut(), *this.include_hsts);
                Poll::Ready(Ok(response))
            }
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
            Poll::Pending => Poll::Pending,
        }
    }
}

fn is_html(headers: &header::HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("text/html"))
        .unwrap_or(false)
}

fn apply_security_headers(headers: &mut header::HeaderMap, include_hsts: bool) {
    let csp = if is_html(headers) {
        CSP_PAGE_VALUE
    } else {
        CSP_API_VALUE
    };

    let static_value = HeaderValue::from_static;
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, static_value(NOSNIFF));
    headers.insert(header::X_FRAME_OPTIONS, static_value(DENY));
    headers.insert(
        HeaderName::from_static(X_XSS_PROTECTION),
        static_value(XSS_BLOCK),
    );
    headers.insert(header::CONTENT_SECURITY_POLICY, static_value(csp));
    headers.insert(header::REFERRER_POLICY, static_value(REFERRER_POLICY_VALUE));
    headers.insert(
        HeaderName::from_static(PERMISSIONS_POLICY),
        static_value(PERMISSIONS_POLICY_VALUE),
    );

    // Only add HSTS in production (HTTPS environments)
    if include_hsts {
        headers.insert(header::STRICT_TRANSPORT_SECURITY, static_value(HSTS_VALUE));
    }
}

pub fn create_security_headers_layer() -> SecurityHeadersLayer {
    SecurityHeadersLayer::from_env()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_headers_layer_creation() {
        let layer = SecurityHeadersLayer::new(false);
        assert!(!layer.include_hsts);

        let layer_with_hsts = SecurityHeadersLayer::new(true);
        assert!(layer_with_hsts.include_hsts);
    }

    #[test]
    fn test_json_responses_get_locked_down_csp() {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        apply_security_headers(&mut headers, false);

        assert_eq!(headers[header::CONTENT_SECURITY_POLICY], CSP_API_VALUE);
        assert!(headers.get(header::STRICT_TRANSPORT_SECURITY).is_none());
    }

    #[test]
    fn test_html_pages_allow_own_assets_and_camera() {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        apply_security_headers(&mut headers, true);

        assert_eq!(headers[header::CONTENT_SECURITY_POLICY], CSP_PAGE_VALUE);
        assert_eq!(headers[PERMISSIONS_POLICY], PERMISSIONS_POLICY_VALUE);
        assert_eq!(headers[header::STRICT_TRANSPORT_SECURITY], HSTS_VALUE);
    }
}
