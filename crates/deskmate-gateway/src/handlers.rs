// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles POST /api/chat, GET /health, GET /api/status, and GET /.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use deskmate_agent::{AdapterHealth, SupportOutcome};
use deskmate_core::{DeskmateError, HealthStatus, SessionId};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::server::GatewayState;

/// Client-facing message for failures inside the pipeline.
pub const PROCESSING_ERROR: &str =
    "An error occurred while processing your request. Please try again.";

/// Request body for POST /api/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    /// Optional session ID; a new one is generated when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response body for POST /api/chat.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    /// Technical, Billing, or General.
    pub category: String,
    /// Positive, Neutral, or Negative.
    pub sentiment: String,
    pub session_id: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

impl ChatResponse {
    pub fn from_outcome(outcome: SupportOutcome, session_id: &SessionId) -> Self {
        Self {
            response: outcome.response,
            category: outcome.category.to_string(),
            sentiment: outcome.sentiment.to_string(),
            session_id: session_id.to_string(),
            timestamp: now(),
        }
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy".
    pub status: String,
    /// "connected" or "disconnected".
    pub vectordb: String,
    pub documents: usize,
    /// Provider and embedder checks. Informational; they do not affect `status`.
    #[serde(default)]
    pub adapters: Vec<AdapterStatus>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdapterStatus {
    pub name: String,
    /// "Provider" or "Embedding".
    pub kind: String,
    pub version: String,
    /// "healthy" or "unhealthy".
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<AdapterHealth> for AdapterStatus {
    fn from(health: AdapterHealth) -> Self {
        let (status, detail) = match health.status {
            HealthStatus::Healthy => ("healthy", None),
            HealthStatus::Unhealthy(reason) => ("unhealthy", Some(reason)),
        };
        Self {
            name: health.name,
            kind: health.adapter_type.to_string(),
            version: health.version,
            status: status.to_string(),
            detail,
        }
    }
}

/// Response body for GET /api/status.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub model: String,
    pub max_query_length: usize,
    pub uptime_secs: u64,
    pub timestamp: String,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
            timestamp: now(),
        }
    }
}

pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Truncates a query for log output.
pub(crate) fn preview(query: &str) -> String {
    query.chars().take(100).collect()
}

/// Maps a pipeline error to a status code and client-safe message.
pub(crate) fn classify_error(err: &DeskmateError) -> (StatusCode, String) {
    if err.is_client_error() {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_ERROR.to_string())
    }
}

/// POST /api/chat
///
/// Runs one query through the support pipeline.
pub async fn post_chat(State(state): State<GatewayState>, Json(body): Json<ChatRequest>) -> Response {
    let session_id = SessionId::from_optional(body.session_id.as_deref());
    info!(
        session_id = %session_id,
        query = %preview(&body.query),
        "processing chat request"
    );

    match state.agent.handle(&body.query).await {
        Ok(outcome) => {
            info!(session_id = %session_id, route = %outcome.route, "chat request processed");
            (
                StatusCode::OK,
                Json(ChatResponse::from_outcome(outcome, &session_id)),
            )
                .into_response()
        }
        Err(e) => {
            let (status, message) = classify_error(&e);
            if status.is_server_error() {
                error!(session_id = %session_id, error = %e, "chat request failed");
            } else {
                info!(session_id = %session_id, reason = %e, "chat request rejected");
            }
            (status, Json(ErrorResponse::new(message))).into_response()
        }
    }
}

/// GET /health
///
/// Healthy iff the knowledge index is available. Always HTTP 200.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let index = state.agent.retriever().status();
    Json(HealthResponse {
        status: if index.is_connected() {
            "healthy"
        } else {
            "unhealthy"
        }
        .to_string(),
        vectordb: index.as_str().to_string(),
        documents: index.documents(),
        adapters: state
            .agent
            .adapter_health()
            .await
            .into_iter()
            .map(AdapterStatus::from)
            .collect(),
        timestamp: now(),
    })
}

/// GET /api/status
pub async fn get_status(State(state): State<GatewayState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.model.to_string(),
        max_query_length: state.agent.max_query_length(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        timestamp: now(),
    })
}

/// GET /
///
/// Serves the front end, or a JSON hint when it is not installed.
pub async fn serve_frontend(State(state): State<GatewayState>) -> Response {
    let index = state.frontend_dir.join("index.html");
    match tokio::fs::read_to_string(&index).await {
        Ok(html) => Html(html).into_response(),
        Err(_) => Json(serde_json::json!({
            "message": "Frontend not found. Send queries to POST /api/chat or connect to /ws/chat."
        }))
        .into_response(),
    }
}
