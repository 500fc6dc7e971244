//! Marketing site backend for Comercio y Negocios Latam SAC.
//!
//! A small HTTP API built with Tokio and Axum: contact-form submission with
//! email delivery, CSRF token issuance, dynamic sitemap/robots, and an AI
//! chat proxy, all behind a fixed request-gating pipeline.
//!
//! # Gate Order
//! ```text
//! request
//!   → CORS origin check
//!   → security response headers
//!   → body size limit
//!   → JSON sanitization (operator-like keys stripped)
//!   → general rate limiter        (100 req / 15 min / client)
//!   → CSRF validation             (state-mutating methods only)
//!   → contact rate limiter        (5 req / 60 min, contact route only)
//!   → handler
//! any failing stage → error responder → uniform JSON error body
//! ```
//!
//! `/api/health` is mounted outside the gate and is never limited.

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod security;

// Business routes
pub mod chat;
pub mod contact;
pub mod email;
pub mod sitemap;

// Cross-cutting concerns
pub mod observability;

pub use config::ServerConfig;
pub use http::HttpServer;
