//! Route handlers.
//!
//! Everything here runs after the gate: bodies are sanitized, the general
//! limiter has counted the request, and state-mutating requests carry a
//! consumed CSRF token. Handlers parse their own bodies from bytes so
//! malformed input maps into the uniform error taxonomy instead of the
//! framework's default rejection.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::chat::ChatRequest;
use crate::contact::{handler as contact, ContactForm};
use crate::error::ApiError;
use crate::http::server::AppState;
use crate::security::csrf;
use crate::sitemap;

/// GET /: service banner.
pub async fn banner() -> Json<Value> {
    Json(json!({
        "message": "Backend API - Comercio y Negocios Latam SAC",
        "status": "online",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "contact": "POST /api/contact"
        }
    }))
}

/// GET /api/health: liveness. Mounted outside the gate, never rate
/// limited or CSRF checked.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Servidor funcionando correctamente",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

/// GET /api/csrf-token: mint the session cookie when absent and issue a
/// fresh token bound to it.
pub async fn csrf_token(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookie_name = state.csrf.cookie_name();
    let (session_id, minted) = match csrf::session_from_headers(&headers, cookie_name) {
        Some(existing) => (existing, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    let token = state.csrf.issue(&session_id);
    let mut response = Json(json!({ "csrfToken": token })).into_response();

    if minted {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Strict",
            cookie_name, session_id
        );
        // Development stays usable over plain HTTP; production never is.
        if state.config.environment == "production" {
            cookie.push_str("; Secure");
        }
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

/// POST /api/contact: validate and deliver a contact submission.
pub async fn submit_contact(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let form: ContactForm = serde_json::from_slice(&body)
        .map_err(|_| ApiError::Validation("El cuerpo de la solicitud no es JSON válido".into()))?;

    contact::validate(&form)?;
    let submission = form.into_submission(Utc::now());
    contact::process(
        state.mailer.as_ref(),
        state.config.email.admin_recipient(),
        &submission,
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Mensaje enviado correctamente"
    })))
}

/// POST /api/chat: forward a prompt to the AI upstream.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let request: ChatRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::Validation("El cuerpo de la solicitud no es JSON válido".into()))?;

    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::Validation("Prompt requerido".into()));
    }

    let result = state.chat.complete(prompt).await?;
    Ok(Json(json!({ "result": result })))
}

/// GET /sitemap.xml
pub async fn sitemap_xml(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        sitemap::sitemap_xml(&state.config.site),
    )
}

/// GET /robots.txt
pub async fn robots_txt(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        sitemap::robots_txt(&state.config.site),
    )
}

/// Fallback for unmatched paths: 404 with the requested path in the body.
pub async fn not_found(uri: Uri) -> Response {
    ApiError::NotFound {
        path: uri.path().to_string(),
    }
    .into_response()
}
