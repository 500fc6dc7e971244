//! Error taxonomy and the global error responder.
//!
//! # Responsibilities
//! - Classify every failure the gate or a handler can produce
//! - Map each class to an HTTP status and a uniform JSON body
//! - Keep internal detail out of responses (full detail goes to the log)
//!
//! # Design Decisions
//! - One enum for the whole request path; stages convert their own
//!   failures and let anything unexpected become `Internal`
//! - Rate-limit denials carry the wait so `Retry-After` can be set
//! - Every request terminates with a JSON body, including the 404 fallback

use std::time::Duration;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::observability::metrics;

/// Failure classes produced by the gate stages and route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad or missing input. The message is safe to show to the caller.
    #[error("{0}")]
    Validation(String),

    /// CSRF token missing, stale, or bound to another session.
    #[error("Token CSRF inválido o ausente")]
    Csrf,

    /// A rate-limit policy denied the request.
    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after: Duration,
    },

    /// A downstream send (email, upstream API) failed. The detail is
    /// logged; the caller only sees a generic message.
    #[error("No se pudo completar la operación, intente nuevamente")]
    Delivery(String),

    /// No route matched the request path.
    #[error("Ruta no encontrada")]
    NotFound { path: String },

    /// Anything unexpected. Never surfaces its detail.
    #[error("Error interno del servidor")]
    Internal(String),
}

/// Uniform JSON error body. `path` is only present for 404s.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ApiError {
    /// HTTP status for this failure class.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Csrf => StatusCode::FORBIDDEN,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn class(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::Csrf => "csrf",
            ApiError::RateLimited { .. } => "rate_limited",
            ApiError::Delivery(_) => "delivery",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Operational log gets the full detail; the body never does.
        match &self {
            ApiError::Delivery(detail) => {
                tracing::error!(class = self.class(), %detail, "Request failed");
            }
            ApiError::Internal(detail) => {
                tracing::error!(class = self.class(), %detail, "Request failed");
            }
            ApiError::RateLimited { retry_after, .. } => {
                tracing::warn!(class = self.class(), retry_after_secs = retry_after.as_secs(), "Request denied");
            }
            other => {
                tracing::debug!(class = other.class(), "Request rejected");
            }
        }
        metrics::record_error(self.class());

        let body = ErrorBody {
            error: self.to_string(),
            path: match &self {
                ApiError::NotFound { path } => Some(path.clone()),
                _ => None,
            },
        };

        let mut response = (status, Json(body)).into_response();

        if let ApiError::RateLimited { retry_after, .. } = &self {
            // Round up so "Retry-After: 0" never accompanies a denial.
            let secs = retry_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
