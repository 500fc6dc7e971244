//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: PORT, NODE_ENV, ALLOWED_ORIGINS,
//!                  EMAIL_*, HF_TOKEN)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow zero-config startup
//! - Environment variables override the file so deployments can tune
//!   limits and credentials without shipping a new file
//! - Rate-limit ceilings and windows are configuration, never constants

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ServerConfig;
