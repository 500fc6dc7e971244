//! JSON body sanitization middleware.
//!
//! Strips object keys that resemble query-operator injection (`$`-prefixed
//! or dotted keys) from JSON request bodies before any handler trusts them.
//! Non-JSON bodies pass through untouched; a body that fails to parse also
//! passes through and is rejected later by the handler's own parsing.

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::error::ErrorBody;

fn is_suspicious_key(key: &str) -> bool {
    key.starts_with('$') || key.contains('.')
}

/// Recursively remove operator-like keys from a JSON value.
pub fn sanitize_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !is_suspicious_key(key));
            for child in map.values_mut() {
                sanitize_value(child);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                sanitize_value(item);
            }
        }
        _ => {}
    }
}

fn is_json(request: &Request<Body>) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false)
}

/// Gate stage: rewrite JSON bodies with suspicious keys dropped.
pub async fn sanitize_middleware(
    State(max_body_bytes): State<usize>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !is_json(&request) {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ErrorBody {
                    error: "Cuerpo de la solicitud demasiado grande".to_string(),
                    path: None,
                }),
            )
                .into_response();
        }
    };

    let bytes = match serde_json::from_slice::<Value>(&bytes) {
        Ok(mut value) => {
            sanitize_value(&mut value);
            match serde_json::to_vec(&value) {
                Ok(clean) => Bytes::from(clean),
                Err(_) => bytes,
            }
        }
        // Malformed JSON: hand the original bytes onward; the handler's
        // parse produces the 400.
        Err(_) => bytes,
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    if let Ok(len) = HeaderValue::from_str(&bytes.len().to_string()) {
        parts.headers.insert(header::CONTENT_LENGTH, len);
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strips_operator_keys() {
        let mut value = json!({
            "nombre": "Ana",
            "$where": "1 == 1",
            "email": "ana@example.com"
        });
        sanitize_value(&mut value);
        assert_eq!(
            value,
            json!({"nombre": "Ana", "email": "ana@example.com"})
        );
    }

    #[test]
    fn test_strips_dotted_and_nested_keys() {
        let mut value = json!({
            "outer": {
                "a.b": 1,
                "$gt": 2,
                "ok": {"$ne": null, "kept": true}
            },
            "items": [{"$in": [1], "x": 1}]
        });
        sanitize_value(&mut value);
        assert_eq!(
            value,
            json!({
                "outer": {"ok": {"kept": true}},
                "items": [{"x": 1}]
            })
        );
    }

    #[test]
    fn test_scalars_untouched() {
        let mut value = json!("just a string with $dollar.and.dots");
        sanitize_value(&mut value);
        assert_eq!(value, json!("just a string with $dollar.and.dots"));
    }
}
