//! CSRF protection: token issuance, validation, and gating middleware.
//!
//! Tokens are bound to a session cookie. `GET /api/csrf-token` mints the
//! session (when absent) and issues a token; state-mutating requests must
//! present that token in a header. A token is good for one use: the gate
//! consumes it on successful validation, so a replayed token is rejected.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use rand::RngCore;

use crate::config::schema::CsrfConfig;
use crate::error::ApiError;
use crate::observability::metrics;

/// A token bound to one session. Issuing a new token for the same session
/// overwrites the previous one (single active token per session).
#[derive(Debug, Clone)]
struct CsrfToken {
    value: String,
    issued_at: Instant,
}

/// Server-side token store, keyed by session id.
pub struct TokenStore {
    tokens: DashMap<String, CsrfToken>,
    ttl: Duration,
    header_name: String,
    cookie_name: String,
}

impl TokenStore {
    pub fn new(config: &CsrfConfig) -> Self {
        Self {
            tokens: DashMap::new(),
            ttl: Duration::from_secs(config.token_ttl_secs),
            header_name: config.token_header.clone(),
            cookie_name: config.cookie_name.clone(),
        }
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Issue a fresh token for the session, replacing any prior one.
    pub fn issue(&self, session_id: &str) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let value = hex::encode(bytes);
        self.tokens.insert(
            session_id.to_string(),
            CsrfToken {
                value: value.clone(),
                issued_at: Instant::now(),
            },
        );
        value
    }

    /// True iff a live token is bound to the session and matches. Never
    /// errors; every failure mode is just `false`.
    pub fn validate(&self, session_id: &str, presented: &str) -> bool {
        match self.tokens.get(session_id) {
            Some(token) => {
                token.issued_at.elapsed() <= self.ttl
                    && constant_time_eq(token.value.as_bytes(), presented.as_bytes())
            }
            None => false,
        }
    }

    /// Validate and, on success, remove the token (single use). Check and
    /// removal are one atomic map operation; concurrent requests presenting
    /// the same token see at most one success.
    pub fn consume(&self, session_id: &str, presented: &str) -> bool {
        self.tokens
            .remove_if(session_id, |_, token| {
                token.issued_at.elapsed() <= self.ttl
                    && constant_time_eq(token.value.as_bytes(), presented.as_bytes())
            })
            .is_some()
    }

    /// Drop the token bound to a session, if any.
    pub fn revoke(&self, session_id: &str) {
        self.tokens.remove(session_id);
    }

    /// Drop expired tokens. Run periodically.
    pub fn sweep(&self) {
        let ttl = self.ttl;
        self.tokens.retain(|_, token| token.issued_at.elapsed() <= ttl);
    }
}

/// Byte comparison that does not short-circuit on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Extract the session id from the Cookie header.
pub fn session_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let cookies = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == cookie_name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Gate stage: state-mutating requests must carry a live token bound to
/// their session. Safe methods pass through untouched.
pub async fn csrf_middleware(
    State(store): State<Arc<TokenStore>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if is_safe_method(request.method()) {
        return next.run(request).await;
    }

    let session = session_from_headers(request.headers(), store.cookie_name());
    let presented = request
        .headers()
        .get(store.header_name())
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    match (session, presented) {
        (Some(session), Some(token)) if store.consume(&session, &token) => {
            next.run(request).await
        }
        (_, None) => {
            metrics::record_csrf_rejected("missing");
            ApiError::Csrf.into_response()
        }
        _ => {
            metrics::record_csrf_rejected("mismatch");
            ApiError::Csrf.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TokenStore {
        TokenStore::new(&CsrfConfig::default())
    }

    #[test]
    fn test_issue_and_validate() {
        let store = store();
        let token = store.issue("session-a");
        assert_eq!(token.len(), 64);
        assert!(store.validate("session-a", &token));
    }

    #[test]
    fn test_token_is_single_use() {
        let store = store();
        let token = store.issue("session-a");
        assert!(store.consume("session-a", &token));
        assert!(!store.consume("session-a", &token));
    }

    #[test]
    fn test_concurrent_consume_accepts_exactly_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::{Arc, Barrier};

        let store = Arc::new(store());
        for round in 0..200 {
            let session = format!("session-{}", round);
            let token = store.issue(&session);
            let successes = Arc::new(AtomicUsize::new(0));
            let barrier = Arc::new(Barrier::new(8));

            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    let session = session.clone();
                    let token = token.clone();
                    let successes = successes.clone();
                    let barrier = barrier.clone();
                    std::thread::spawn(move || {
                        barrier.wait();
                        if store.consume(&session, &token) {
                            successes.fetch_add(1, Ordering::SeqCst);
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            assert_eq!(successes.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_token_bound_to_session() {
        let store = store();
        let token = store.issue("session-a");
        assert!(!store.validate("session-b", &token));
        assert!(!store.consume("session-b", &token));
        // The bound session can still use it.
        assert!(store.validate("session-a", &token));
    }

    #[test]
    fn test_issue_overwrites_previous_token() {
        let store = store();
        let first = store.issue("session-a");
        let second = store.issue("session-a");
        assert_ne!(first, second);
        assert!(!store.validate("session-a", &first));
        assert!(store.validate("session-a", &second));
    }

    #[test]
    fn test_missing_session_or_token_is_false_not_error() {
        let store = store();
        assert!(!store.validate("never-seen", "anything"));
        assert!(!store.validate("never-seen", ""));
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = CsrfConfig {
            token_ttl_secs: 0,
            ..CsrfConfig::default()
        };
        // ttl_secs = 0 is rejected by config validation, but the store
        // itself must treat an elapsed ttl as stale.
        let store = TokenStore::new(&config);
        let token = store.issue("session-a");
        std::thread::sleep(Duration::from_millis(5));
        assert!(!store.validate("session-a", &token));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_session_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            "other=1; cnl_session=abc123; theme=dark".parse().unwrap(),
        );
        assert_eq!(
            session_from_headers(&headers, "cnl_session"),
            Some("abc123".to_string())
        );
        assert_eq!(session_from_headers(&headers, "missing"), None);
    }

    #[test]
    fn test_sweep_drops_expired() {
        let config = CsrfConfig {
            token_ttl_secs: 0,
            ..CsrfConfig::default()
        };
        let store = TokenStore::new(&config);
        store.issue("session-a");
        std::thread::sleep(Duration::from_millis(5));
        store.sweep();
        assert!(store.tokens.is_empty());
    }
}
