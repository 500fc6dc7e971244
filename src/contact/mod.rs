//! Contact-form subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/contact (already gated: sanitized, rate limited, CSRF checked)
//!     → types.rs (deserialize, trim, timestamp)
//!     → handler.rs (validate required fields + email shape)
//!     → email subsystem (admin notification, user acknowledgment)
//!     → 200 on full delivery, 400/500 via the error responder otherwise
//! ```

pub mod handler;
pub mod types;

pub use types::{ContactForm, ContactSubmission};
