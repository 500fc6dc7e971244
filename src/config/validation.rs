//! Semantic configuration checks, applied after deserialization.

use std::net::SocketAddr;

use crate::config::schema::{RatePolicyConfig, ServerConfig};

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn check_policy(name: &str, policy: &RatePolicyConfig, errors: &mut Vec<ValidationError>) {
    if policy.max_requests == 0 {
        errors.push(ValidationError(format!(
            "rate_limit.{}: max_requests must be > 0",
            name
        )));
    }
    if policy.window_secs == 0 {
        errors.push(ValidationError(format!(
            "rate_limit.{}: window_secs must be > 0",
            name
        )));
    }
}

/// Validate the config beyond what serde can express.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError(format!(
            "listener.bind_address is not a socket address: {}",
            config.listener.bind_address
        )));
    }
    check_policy("general", &config.rate_limit.general, &mut errors);
    check_policy("contact", &config.rate_limit.contact, &mut errors);
    if config.csrf.token_ttl_secs == 0 {
        errors.push(ValidationError("csrf.token_ttl_secs must be > 0".into()));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError("timeouts.upstream_secs must be > 0".into()));
    }
    if config.security.max_body_bytes == 0 {
        errors.push(ValidationError("security.max_body_bytes must be > 0".into()));
    }
    if config.site.base_url.ends_with('/') {
        errors.push(ValidationError(
            "site.base_url must not end with a slash".into(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
