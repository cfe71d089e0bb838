// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket handler for real-time chat.
//!
//! Client -> Server (raw text or JSON):
//! ```json
//! {"query": "Do you support on-premises deployment?", "session_id": "optional"}
//! ```
//!
//! Server -> Client (JSON):
//! ```json
//! {"type": "typing"}
//! {"type": "message_complete", "response": "...", "category": "Technical", "sentiment": "Neutral", "session_id": "...", "timestamp": "..."}
//! {"type": "error", "error": "Query cannot be empty.", "timestamp": "..."}
//! ```

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use deskmate_core::SessionId;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use crate::handlers::{classify_error, now, preview, ChatResponse};
use crate::server::GatewayState;

/// WebSocket message type constants for server -> client messages.
pub mod message_types {
    /// Typing indicator, sent before the pipeline runs.
    pub const TYPING: &str = "typing";
    /// Complete reply.
    pub const MESSAGE_COMPLETE: &str = "message_complete";
    /// Validation or processing failure; the connection stays open.
    pub const ERROR: &str = "error";
}

#[derive(Debug, Deserialize)]
struct WsIncoming {
    query: String,
    #[serde(default)]
    session_id: Option<String>,
}

/// Interprets a client frame as `{query, session_id?}` JSON, or else as the raw query.
fn parse_incoming(text: &str) -> (String, Option<String>) {
    if text.trim_start().starts_with('{')
        && let Ok(incoming) = serde_json::from_str::<WsIncoming>(text)
    {
        return (incoming.query, incoming.session_id);
    }
    (text.to_string(), None)
}

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
///
/// Frames are processed one at a time; each gets a typing indicator followed
/// by either a complete message or an error.
async fn handle_socket(socket: WebSocket, state: GatewayState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let connection_session = SessionId::generate();
    info!(session_id = %connection_session, "WebSocket connection established");

    while let Some(Ok(msg)) = ws_receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let (query, session_override) = parse_incoming(text.as_str());
        let session_id = match session_override.as_deref() {
            Some(raw) if !raw.trim().is_empty() => SessionId::from_optional(Some(raw)),
            _ => connection_session.clone(),
        };
        debug!(session_id = %session_id, query = %preview(&query), "WebSocket message received");

        let typing = json!({ "type": message_types::TYPING }).to_string();
        if ws_sender.send(Message::Text(typing.into())).await.is_err() {
            break;
        }

        let reply = match state.agent.handle(&query).await {
            Ok(outcome) => {
                let mut body = serde_json::to_value(ChatResponse::from_outcome(outcome, &session_id))
                    .unwrap_or_else(|_| json!({}));
                body["type"] = json!(message_types::MESSAGE_COMPLETE);
                body
            }
            Err(e) => {
                let (status, message) = classify_error(&e);
                if status.is_server_error() {
                    error!(session_id = %session_id, error = %e, "WebSocket request failed");
                }
                json!({
                    "type": message_types::ERROR,
                    "error": message,
                    "timestamp": now(),
                })
            }
        };

        if ws_sender
            .send(Message::Text(reply.to_string().into()))
            .await
            .is_err()
        {
            break;
        }
    }

    info!(session_id = %connection_session, "WebSocket disconnected");
}
