//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the backend.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so a minimal deployment needs no file at all.
//! Rate-limit ceilings and windows live here, never in code.

use serde::{Deserialize, Serialize};

/// Root configuration for the site backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Deployment environment label ("development" or "production").
    pub environment: String,

    /// CORS configuration.
    pub cors: CorsConfig,

    /// Security hardening (headers, body limits).
    pub security: SecurityConfig,

    /// Rate limiting policies.
    pub rate_limit: RateLimitConfig,

    /// CSRF protection settings.
    pub csrf: CsrfConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Email delivery settings.
    pub email: EmailConfig,

    /// AI chat proxy settings.
    pub chat: ChatConfig,

    /// Public site description (sitemap, robots).
    pub site: SiteConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            environment: "development".to_string(),
            cors: CorsConfig::default(),
            security: SecurityConfig::default(),
            rate_limit: RateLimitConfig::default(),
            csrf: CsrfConfig::default(),
            timeouts: TimeoutConfig::default(),
            email: EmailConfig::default(),
            chat: ChatConfig::default(),
            site: SiteConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. Empty list mirrors the request origin, which is
    /// what a same-domain deployment wants.
    pub allowed_origins: Vec<String>,
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Add security response headers (CSP, HSTS, nosniff).
    pub enable_headers: bool,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// A single rate-limit policy: `max_requests` per `window_secs` per client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RatePolicyConfig {
    /// Requests allowed inside one window.
    pub max_requests: u32,

    /// Window length in seconds.
    pub window_secs: u64,

    /// Message returned on denial.
    pub message: String,
}

/// Rate limiting configuration: one policy for all traffic, one stricter
/// policy mounted only on the contact route. Evaluated independently.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// General traffic policy.
    pub general: RatePolicyConfig,

    /// Contact-form policy.
    pub contact: RatePolicyConfig,

    /// How often idle buckets are swept, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            general: RatePolicyConfig {
                max_requests: 100,
                window_secs: 15 * 60,
                message: "Demasiadas solicitudes desde esta IP, intente nuevamente más tarde"
                    .to_string(),
            },
            contact: RatePolicyConfig {
                max_requests: 5,
                window_secs: 60 * 60,
                message: "Has alcanzado el límite de envíos. Intenta nuevamente en 1 hora"
                    .to_string(),
            },
            sweep_interval_secs: 300,
        }
    }
}

/// CSRF protection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Token lifetime in seconds. Stale tokens are rejected.
    pub token_ttl_secs: u64,

    /// Request header carrying the token.
    pub token_header: String,

    /// Session cookie name the token is bound to.
    pub cookie_name: String,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: 3600,
            token_header: "x-csrf-token".to_string(),
            cookie_name: "cnl_session".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Timeout for each upstream call (mail API, chat API) in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 10,
        }
    }
}

/// Email delivery configuration. Credentials come from the environment
/// (`EMAIL_USER`, `EMAIL_PASSWORD`, `EMAIL_SERVICE`, `EMAIL_TO`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Base URL of the HTTP mail API.
    pub api_base: String,

    /// Provider label, informational only.
    pub service: String,

    /// Sender address.
    pub user: String,

    /// API key for the mail API.
    pub password: String,

    /// Admin notification recipient. Falls back to `user` when empty.
    pub to: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.resend.com".to_string(),
            service: "resend".to_string(),
            user: String::new(),
            password: String::new(),
            to: String::new(),
        }
    }
}

impl EmailConfig {
    /// Admin recipient, defaulting to the sender when unset.
    pub fn admin_recipient(&self) -> &str {
        if self.to.is_empty() {
            &self.user
        } else {
            &self.to
        }
    }
}

/// AI chat proxy configuration. The token comes from `HF_TOKEN`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Chat-completions endpoint URL.
    pub api_url: String,

    /// Model identifier sent upstream.
    pub model: String,

    /// Bearer token for the upstream API.
    pub token: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: "https://router.huggingface.co/v1/chat/completions".to_string(),
            model: "openai/gpt-oss-120b:fastest".to_string(),
            token: String::new(),
        }
    }
}

/// Public site description used by the sitemap generator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Canonical base URL, without trailing slash.
    pub base_url: String,

    /// Site paths listed in the sitemap.
    pub pages: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://comercionegocioslatam.com".to_string(),
            pages: vec![
                "/".to_string(),
                "/servicios".to_string(),
                "/nosotros".to_string(),
                "/contacto".to_string(),
            ],
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
