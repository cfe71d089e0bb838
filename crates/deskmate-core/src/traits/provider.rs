// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for hosted LLM integrations.

use async_trait::async_trait;

use crate::error::DeskmateError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CompletionRequest, CompletionResponse};

/// Adapter for LLM chat-completion APIs.
///
/// The classifier, the sentiment scorer, and the responder each make a
/// single non-streaming call per request through this trait.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, DeskmateError>;
}
