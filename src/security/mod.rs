//! Security subsystem: the request-gating stages.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → CORS (tower-http layer, wired in http/server.rs)
//!     → headers.rs (security response headers)
//!     → body size limit (tower-http layer)
//!     → sanitize.rs (strip operator-like JSON keys)
//!     → rate_limit.rs (general policy)
//!     → csrf.rs (state-mutating requests only)
//!     → rate_limit.rs (contact policy, contact route only)
//!     → Pass to handler
//! ```
//!
//! Any stage that fails short-circuits the chain into the error responder;
//! no later stage runs. Sanitization runs before anything trusts the body,
//! and rate limiting runs before CSRF so abusive traffic never reaches
//! token validation.
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input

pub mod csrf;
pub mod headers;
pub mod rate_limit;
pub mod sanitize;
