//! HTTP Server
//!
//! Routing, request tracing, rate limiting and graceful shutdown.

use crate::error::ApiError;
use crate::handler::{self, ApiState};
use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8080;

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Builds the axum Router with all endpoints
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handler::health))
        .route(
            "/queues",
            get(handler::list_queues).post(handler::create_queue),
        )
        .route("/queues/short/{short_id}", get(handler::find_by_short_id))
        .route("/queues/{queue_id}", get(handler::view_queue))
        .route("/queues/{queue_id}/manage", get(handler::manage_queue))
        .route("/queues/{queue_id}/archive", get(handler::queue_archive))
        .route(
            "/queues/{queue_id}/service-time",
            axum::routing::put(handler::update_service_time),
        )
        .route("/queues/{queue_id}/join", post(handler::join_queue))
        .route("/queues/{queue_id}/leave", post(handler::leave_queue))
        .route("/queues/{queue_id}/add-known", post(handler::add_known))
        .route(
            "/queues/{queue_id}/customers/{customer_id}/no-show",
            post(handler::mark_no_show),
        )
        .route(
            "/queues/{queue_id}/customers/{customer_id}/serve",
            post(handler::mark_served),
        )
        .route(
            "/users/me/profile",
            get(handler::get_profile).put(handler::put_profile),
        )
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Throttle mutating requests; reads are never limited
async fn rate_limit(State(state): State<ApiState>, req: Request, next: Next) -> Response {
    let mutating = !matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS);
    if mutating && !state.rate_limiter.check() {
        warn!(method = %req.method(), path = %req.uri().path(), "Rate limit exceeded");
        return ApiError::RateLimited.into_response();
    }
    next.run(req).await
}

/// HTTP Server
pub struct HttpServer {
    config: HttpServerConfig,
    state: ApiState,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: ApiState) -> Self {
        Self { config, state }
    }

    /// Bind and serve until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let local: SocketAddr = listener.local_addr()?;

        info!(address = %local, "HTTP server listening");

        axum::serve(listener, build_router(self.state))
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
#[path = "server_test.rs"]
mod server_test;
