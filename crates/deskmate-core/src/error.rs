// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Deskmate support service.

use thiserror::Error;

/// Error type shared by the adapters, the support pipeline and the gateway.
#[derive(Debug, Error)]
pub enum DeskmateError {
    /// Configuration errors (missing API key, invalid header values, bad paths).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Vector collection database or (de)serialization failure.
    #[error("vector store: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Listener bind, socket or server shutdown failure.
    #[error("gateway: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM or embedding provider errors (API failure, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Knowledge base errors (missing document file, malformed JSON, empty index).
    #[error("knowledge base error: {message}")]
    Knowledge {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A query was rejected before entering the pipeline.
    #[error("{0}")]
    InvalidQuery(String),

    /// Broken invariant inside the service.
    #[error("unexpected failure: {0}")]
    Internal(String),
}

impl DeskmateError {
    /// Returns true when the error was caused by the caller's input rather than
    /// by a failure inside the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DeskmateError::InvalidQuery(_))
    }
}
