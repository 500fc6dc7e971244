//! Shared utilities for integration testing.
//!
//! Tests boot the real server on an ephemeral loopback port and point its
//! upstream collaborators (mail API, chat API) at in-process mocks.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use cnl_backend::{HttpServer, ServerConfig};

/// Recording mock for the HTTP mail API.
#[derive(Clone, Default)]
pub struct MockMailApi {
    pub sent: Arc<Mutex<Vec<Value>>>,
    fail: Arc<AtomicBool>,
}

impl MockMailApi {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    #[allow(dead_code)]
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

/// Start a mock mail API accepting `POST /emails`.
pub async fn start_mock_mail_api() -> (SocketAddr, MockMailApi) {
    let mock = MockMailApi::default();
    let app = Router::new()
        .route(
            "/emails",
            post(
                |State(api): State<MockMailApi>, Json(body): Json<Value>| async move {
                    if api.fail.load(Ordering::SeqCst) {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({"error": "mock failure"})),
                        )
                    } else {
                        api.sent.lock().unwrap().push(body);
                        (StatusCode::OK, Json(json!({"id": "mock"})))
                    }
                },
            ),
        )
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, mock)
}

/// Start a mock chat-completions upstream returning a fixed reply.
#[allow(dead_code)]
pub async fn start_mock_chat_api(reply: &'static str, status: u16) -> SocketAddr {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |Json(_): Json<Value>| async move {
            let code = StatusCode::from_u16(status).unwrap();
            if code.is_success() {
                (
                    code,
                    Json(json!({"choices": [{"message": {"content": reply}}]})),
                )
            } else {
                (code, Json(json!({"error": "mock upstream failure"})))
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Default test configuration with email credentials filled in.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.email.user = "web@example.com".to_string();
    config.email.password = "test-key".to_string();
    config.email.to = "admin@example.com".to_string();
    config
}

/// Boot the backend on an ephemeral port and return its base URL.
pub async fn start_backend(config: ServerConfig) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        server.run(listener).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Fetch a CSRF token, returning the session cookie and the token.
#[allow(dead_code)]
pub async fn fetch_csrf(client: &reqwest::Client, base: &str) -> (String, String) {
    let response = client
        .get(format!("{}/api/csrf-token", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("token endpoint mints a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let body: Value = response.json().await.unwrap();
    let token = body["csrfToken"].as_str().unwrap().to_string();
    (cookie, token)
}

/// A well-formed contact payload.
#[allow(dead_code)]
pub fn contact_payload() -> Value {
    json!({
        "nombre": "Ana Pérez",
        "empresa": "ACME SAC",
        "email": "ana@example.com",
        "telefono": "+51 999 999 999",
        "mensaje": "Quisiera más información sobre sus servicios."
    })
}
