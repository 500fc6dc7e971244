//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, gate layer wiring, graceful shutdown)
//!     → security layers (see security/mod.rs for the gate order)
//!     → handlers.rs (banner, health, csrf token, contact, chat, sitemap)
//!     → error.rs turns any failure into the uniform JSON body
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
