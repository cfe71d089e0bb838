// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for the Deskmate support service.
//!
//! Exposes the support pipeline as a JSON API (`/api/chat`), a WebSocket chat
//! endpoint (`/ws/chat`), health and status probes, and the static browser
//! front end.

pub mod handlers;
pub mod server;
pub mod ws;

pub use handlers::{
    AdapterStatus, ChatRequest, ChatResponse, ErrorResponse, HealthResponse, StatusResponse,
};
pub use server::{build_router, serve, start_server, GatewayState};
