// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use deskmate_agent::SupportAgent;
use deskmate_config::model::ServerConfig;
use deskmate_core::DeskmateError;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handlers;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The support pipeline; shared read-only across requests.
    pub agent: Arc<SupportAgent>,
    /// Chat model name reported by `/api/status`.
    pub model: Arc<str>,
    /// Directory holding `index.html` and `static/`.
    pub frontend_dir: PathBuf,
    /// Process start time for uptime reporting.
    pub start_time: std::time::Instant,
}

impl GatewayState {
    pub fn new(agent: Arc<SupportAgent>, model: &str, frontend_dir: impl Into<PathBuf>) -> Self {
        Self {
            agent,
            model: Arc::from(model),
            frontend_dir: frontend_dir.into(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Builds the CORS layer from configured origins; `*` (or no origins) allows any.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o.trim() == "*") {
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Assembles the full application router.
///
/// - GET  /            front end (index.html)
/// - GET  /static/*    front-end assets
/// - GET  /health      index connectivity
/// - POST /api/chat    one query through the pipeline
/// - GET  /api/status  service metadata
/// - GET  /ws/chat     WebSocket chat
pub fn build_router(state: GatewayState, config: &ServerConfig) -> Router {
    let static_dir = state.frontend_dir.join("static");

    let api_routes = Router::new()
        .route("/", get(handlers::serve_frontend))
        .route("/health", get(handlers::get_health))
        .route("/api/chat", post(handlers::post_chat))
        .route("/api/status", get(handlers::get_status))
        .route("/ws/chat", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins))
}

/// Binds to the configured host:port and serves until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), DeskmateError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| DeskmateError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("Gateway server listening on {addr}");
    let app = build_router(state, config);
    serve(listener, app, cancel).await
}

/// Serves an already-bound listener with graceful shutdown.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    cancel: CancellationToken,
) -> Result<(), DeskmateError> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| DeskmateError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("gateway server stopped");
    Ok(())
}
