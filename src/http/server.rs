//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router with all handlers
//! - Wire the gate layers in their fixed order:
//!   CORS → security headers → body limit → sanitize → general rate limit
//!   → CSRF → (contact rate limit on its route) → handler
//! - Mount the liveness route outside the gate
//! - Spawn the idle-bucket / stale-token sweeper
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - axum layers run outermost-last-added, so the gate stages are added in
//!   reverse of their request-time order
//! - The contact limiter is a route layer: it only ever sees contact
//!   traffic and is evaluated independently of the general limiter

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{header, HeaderName, HeaderValue, Method, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::chat::ChatClient;
use crate::config::schema::CorsConfig;
use crate::config::ServerConfig;
use crate::email::{HttpMailer, Mailer};
use crate::http::handlers;
use crate::observability::metrics;
use crate::security::csrf::{csrf_middleware, TokenStore};
use crate::security::headers::security_headers_middleware;
use crate::security::rate_limit::{rate_limit_middleware, MemoryBucketStore, RateLimiter};
use crate::security::sanitize::sanitize_middleware;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub csrf: Arc<TokenStore>,
    pub mailer: Arc<dyn Mailer>,
    pub chat: Arc<ChatClient>,
}

/// HTTP server for the site backend.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    general_limiter: Arc<RateLimiter>,
    contact_limiter: Arc<RateLimiter>,
    csrf: Arc<TokenStore>,
}

impl HttpServer {
    /// Create a server with the production mailer.
    pub fn new(config: ServerConfig) -> Result<Self, reqwest::Error> {
        let upstream_timeout = Duration::from_secs(config.timeouts.upstream_secs);
        let mailer: Arc<dyn Mailer> =
            Arc::new(HttpMailer::new(config.email.clone(), upstream_timeout)?);
        Self::with_mailer(config, mailer)
    }

    /// Create a server with an injected mailer (the collaborator seam).
    pub fn with_mailer(
        config: ServerConfig,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, reqwest::Error> {
        let upstream_timeout = Duration::from_secs(config.timeouts.upstream_secs);
        let chat = Arc::new(ChatClient::new(config.chat.clone(), upstream_timeout)?);
        let csrf = Arc::new(TokenStore::new(&config.csrf));
        let general_limiter = Arc::new(RateLimiter::new(
            "general",
            &config.rate_limit.general,
            Box::new(MemoryBucketStore::new()),
        ));
        let contact_limiter = Arc::new(RateLimiter::new(
            "contact",
            &config.rate_limit.contact,
            Box::new(MemoryBucketStore::new()),
        ));

        let state = AppState {
            config: Arc::new(config.clone()),
            csrf: csrf.clone(),
            mailer,
            chat,
        };

        let router = Self::build_router(&config, state, &general_limiter, &contact_limiter);
        Ok(Self {
            router,
            config,
            general_limiter,
            contact_limiter,
            csrf,
        })
    }

    /// Build the axum router with the gate layers in order.
    fn build_router(
        config: &ServerConfig,
        state: AppState,
        general_limiter: &Arc<RateLimiter>,
        contact_limiter: &Arc<RateLimiter>,
    ) -> Router {
        let gated = Router::new()
            .route("/", get(handlers::banner))
            .route("/api/csrf-token", get(handlers::csrf_token))
            .route(
                "/api/contact",
                post(handlers::submit_contact).layer(middleware::from_fn_with_state(
                    contact_limiter.clone(),
                    rate_limit_middleware,
                )),
            )
            .route("/api/chat", post(handlers::chat))
            .route("/sitemap.xml", get(handlers::sitemap_xml))
            .route("/robots.txt", get(handlers::robots_txt))
            .fallback(handlers::not_found)
            // Request-time order is the reverse of the order added here.
            .layer(middleware::from_fn_with_state(
                state.csrf.clone(),
                csrf_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                general_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                config.security.max_body_bytes,
                sanitize_middleware,
            ))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_bytes))
            .with_state(state);

        // Liveness sits outside the gate: never rate limited, never CSRF
        // checked, but still behind CORS/headers/tracing below.
        let mut app = gated.merge(Router::new().route("/api/health", get(handlers::health)));

        if config.security.enable_headers {
            app = app.layer(middleware::from_fn(security_headers_middleware));
        }

        app.layer(cors_layer(&config.cors))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(record_request_middleware))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        // Periodic sweep: idle rate buckets and expired CSRF tokens.
        let sweep_interval = Duration::from_secs(self.config.rate_limit.sweep_interval_secs);
        let general = self.general_limiter.clone();
        let contact = self.contact_limiter.clone();
        let csrf = self.csrf.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_interval);
            interval.tick().await; // first tick is immediate
            loop {
                interval.tick().await;
                general.sweep();
                contact.sweep();
                csrf.sweep();
                tracing::debug!("Swept idle buckets and stale tokens");
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-csrf-token"),
        ])
        .allow_credentials(true);

    if config.allowed_origins.is_empty() {
        // Same-domain deployment: reflect whatever origin called us.
        layer.allow_origin(AllowOrigin::mirror_request())
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Metrics label for a request: the matched route pattern. Unmatched paths
/// (the 404 fallback) share one label so scans cannot mint new series.
fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

/// Record method/status/latency for every request.
async fn record_request_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = route_label(&request);
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), &route, start);
    response
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_paths_share_one_route_label() {
        let scan_a = Request::builder()
            .uri("/wp-admin/setup.php")
            .body(Body::empty())
            .unwrap();
        let scan_b = Request::builder()
            .uri("/.env")
            .body(Body::empty())
            .unwrap();
        assert_eq!(route_label(&scan_a), "unmatched");
        assert_eq!(route_label(&scan_b), "unmatched");
    }
}
