//! AI chat proxy subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/chat {prompt}
//!     → proxy.rs (forward to chat-completions upstream, bearer HF_TOKEN,
//!                 bounded timeout)
//!     → {result} back to the browser
//! ```
//!
//! The token stays server-side; the browser only ever talks to this route.

pub mod proxy;

pub use proxy::{ChatClient, ChatRequest};
