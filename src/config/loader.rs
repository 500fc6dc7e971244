//! Configuration loading from disk and the environment.

use std::env;
use std::fs;
use std::path::Path;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: TOML file (when given), then environment overrides,
/// then semantic validation.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => ServerConfig::default(),
    };

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Recognized environment variables. These win over the config file so a
/// deployment can be tuned without shipping a new file.
fn apply_env_overrides(config: &mut ServerConfig) {
    if let Ok(port) = env::var("PORT") {
        config.listener.bind_address = format!("0.0.0.0:{}", port);
    }
    if let Ok(environment) = env::var("NODE_ENV") {
        config.environment = environment;
    }
    if let Ok(origins) = env::var("ALLOWED_ORIGINS") {
        config.cors.allowed_origins = origins
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
    }
    if let Ok(user) = env::var("EMAIL_USER") {
        config.email.user = user;
    }
    if let Ok(password) = env::var("EMAIL_PASSWORD") {
        config.email.password = password;
    }
    if let Ok(service) = env::var("EMAIL_SERVICE") {
        config.email.service = service;
    }
    if let Ok(to) = env::var("EMAIL_TO") {
        config.email.to = to;
    }
    if let Ok(token) = env::var("HF_TOKEN") {
        config.chat.token = token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pass_validation() {
        let config = ServerConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.rate_limit.general.max_requests, 100);
        assert_eq!(config.rate_limit.general.window_secs, 900);
        assert_eq!(config.rate_limit.contact.max_requests, 5);
        assert_eq!(config.rate_limit.contact.window_secs, 3600);
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml = r#"
            environment = "production"

            [listener]
            bind_address = "127.0.0.1:8080"

            [rate_limit.general]
            max_requests = 10
            window_secs = 60
            message = "despacio"

            [rate_limit.contact]
            max_requests = 2
            window_secs = 120
            message = "despacio"
        "#;
        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.environment, "production");
        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert_eq!(config.rate_limit.general.max_requests, 10);
        // Untouched sections keep their defaults.
        assert_eq!(config.csrf.token_header, "x-csrf-token");
        assert_eq!(config.security.max_body_bytes, 2 * 1024 * 1024);
    }
}
