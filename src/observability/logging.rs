//! Structured logging initialization.
//!
//! Uses the tracing crate. The filter comes from `RUST_LOG` when set,
//! otherwise from the configured log level.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber. Call once at startup.
pub fn init_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("cnl_backend={},tower_http=info", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
