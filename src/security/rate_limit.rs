//! Fixed-window rate limiting middleware.
//!
//! Two policies run in production: a general one applied to all gated
//! routes and a stricter one mounted only on the contact route. Each
//! policy keeps one bucket per client identity; a bucket is created lazily
//! on first sight and reset in place when its window expires. Idle buckets
//! are evicted by a periodic sweep.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::config::schema::RatePolicyConfig;
use crate::error::ApiError;
use crate::observability::metrics;

/// Request count within the current window for one (policy, identity) pair.
#[derive(Debug, Clone, Copy)]
pub struct RateBucket {
    pub window_start: Instant,
    pub count: u32,
}

/// Storage for rate buckets. In-process deployments use [`MemoryBucketStore`];
/// a multi-worker deployment can swap in a shared store without touching the
/// limiter logic.
pub trait BucketStore: Send + Sync {
    fn get(&self, key: &str) -> Option<RateBucket>;
    fn set(&self, key: String, bucket: RateBucket);
    fn evict(&self, key: &str);
    /// Drop every bucket whose window started before `cutoff`.
    fn evict_older_than(&self, cutoff: Instant);
    fn len(&self) -> usize;
}

/// Mutex-guarded in-memory bucket store.
#[derive(Default)]
pub struct MemoryBucketStore {
    inner: Mutex<HashMap<String, RateBucket>>,
}

impl MemoryBucketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BucketStore for MemoryBucketStore {
    fn get(&self, key: &str) -> Option<RateBucket> {
        self.inner
            .lock()
            .expect("bucket store mutex poisoned")
            .get(key)
            .copied()
    }

    fn set(&self, key: String, bucket: RateBucket) {
        self.inner
            .lock()
            .expect("bucket store mutex poisoned")
            .insert(key, bucket);
    }

    fn evict(&self, key: &str) {
        self.inner
            .lock()
            .expect("bucket store mutex poisoned")
            .remove(key);
    }

    fn evict_older_than(&self, cutoff: Instant) {
        self.inner
            .lock()
            .expect("bucket store mutex poisoned")
            .retain(|_, bucket| bucket.window_start >= cutoff);
    }

    fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("bucket store mutex poisoned")
            .len()
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy)]
pub struct Decision {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after: Option<Duration>,
}

/// One rate-limit policy with its bucket store.
pub struct RateLimiter {
    name: &'static str,
    max_requests: u32,
    window: Duration,
    message: String,
    store: Box<dyn BucketStore>,
    // Serializes the get-compute-set sequence so simultaneous requests
    // from one identity never lose increments across the store seam.
    gate: Mutex<()>,
}

impl RateLimiter {
    pub fn new(name: &'static str, policy: &RatePolicyConfig, store: Box<dyn BucketStore>) -> Self {
        Self {
            name,
            max_requests: policy.max_requests,
            window: Duration::from_secs(policy.window_secs),
            message: policy.message.clone(),
            store,
            gate: Mutex::new(()),
        }
    }

    /// Policy name, used for logs and metrics labels.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Denial message for this policy.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check and count one request from `identity`.
    pub fn check(&self, identity: &str) -> Decision {
        self.check_at(identity, Instant::now())
    }

    fn check_at(&self, identity: &str, now: Instant) -> Decision {
        let _serialized = self.gate.lock().expect("rate limiter mutex poisoned");

        match self.store.get(identity) {
            Some(bucket) if now.duration_since(bucket.window_start) < self.window => {
                if bucket.count >= self.max_requests {
                    let elapsed = now.duration_since(bucket.window_start);
                    Decision {
                        allowed: false,
                        remaining: 0,
                        retry_after: Some(self.window - elapsed),
                    }
                } else {
                    let count = bucket.count + 1;
                    self.store.set(
                        identity.to_string(),
                        RateBucket {
                            window_start: bucket.window_start,
                            count,
                        },
                    );
                    Decision {
                        allowed: true,
                        remaining: self.max_requests - count,
                        retry_after: None,
                    }
                }
            }
            // First sight of this identity, or the window rolled over:
            // reset in place with count = 1.
            _ => {
                self.store.set(
                    identity.to_string(),
                    RateBucket {
                        window_start: now,
                        count: 1,
                    },
                );
                Decision {
                    allowed: true,
                    remaining: self.max_requests - 1,
                    retry_after: None,
                }
            }
        }
    }

    /// Evict buckets idle for at least two full windows. Run periodically.
    pub fn sweep(&self) {
        let _serialized = self.gate.lock().expect("rate limiter mutex poisoned");
        if let Some(cutoff) = Instant::now().checked_sub(self.window * 2) {
            self.store.evict_older_than(cutoff);
        }
    }
}

/// Client identity for bucket keys: first X-Forwarded-For hop when present
/// (the backend sits behind a reverse proxy in production), otherwise the
/// socket peer address.
pub fn client_identity(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| addr.ip().to_string())
}

/// Middleware enforcing one policy. Mounted once with the general limiter
/// and again on the contact route with the contact limiter.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let identity = client_identity(request.headers(), addr);
    let decision = limiter.check(&identity);

    if decision.allowed {
        next.run(request).await
    } else {
        tracing::warn!(
            client = %identity,
            policy = limiter.name(),
            "Rate limit exceeded"
        );
        metrics::record_rate_limited(limiter.name());
        ApiError::RateLimited {
            message: limiter.message().to_string(),
            retry_after: decision.retry_after.unwrap_or(Duration::from_secs(1)),
        }
        .into_response()
    }
}
