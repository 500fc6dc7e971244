//! Security response headers.
//!
//! # Responsibilities
//! - Strict Content-Security-Policy (self + the analytics/fonts origins the
//!   site actually loads from)
//! - HSTS, nosniff, frame and referrer policies
//!
//! # Design Decisions
//! - Applied outside the gate stages so even rejected requests carry
//!   consistent headers
//! - Values are static; there is nothing per-request about them

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     script-src 'self' 'unsafe-inline' https://www.googletagmanager.com https://www.google-analytics.com; \
     style-src 'self' 'unsafe-inline' https://fonts.googleapis.com; \
     font-src 'self' https://fonts.gstatic.com; \
     img-src 'self' data: https:; \
     connect-src 'self' https://api.resend.com https://www.google-analytics.com https://www.googletagmanager.com; \
     frame-src 'self' https://www.googletagmanager.com; \
     object-src 'none'; \
     upgrade-insecure-requests";

/// Add the security header set to every response.
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );
    headers.insert(
        "strict-transport-security",
        HeaderValue::from_static("max-age=31536000; includeSubDomains; preload"),
    );
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(
        "x-xss-protection",
        HeaderValue::from_static("1; mode=block"),
    );
    response
}
