//! Email delivery subsystem.
//!
//! # Data Flow
//! ```text
//! contact handler
//!     → templates.rs (admin notification + user acknowledgment HTML)
//!     → service.rs (Mailer trait → HTTP mail API, bounded timeout)
//! ```
//!
//! # Design Decisions
//! - The handler depends on the `Mailer` trait, not the HTTP client, so a
//!   distributed deployment or a test can swap the transport
//! - Both sends must succeed; either failure fails the whole submission

pub mod service;
pub mod templates;

pub use service::{EmailError, HttpMailer, Mailer, OutboundEmail};
