// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted [`ProviderAdapter`] for pipeline and gateway tests.
//!
//! The classifier, sentiment analyzer and generator each make one completion
//! call, so a test scripts a query by queueing the replies in that order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use deskmate_core::traits::adapter::PluginAdapter;
use deskmate_core::traits::provider::ProviderAdapter;
use deskmate_core::types::{CompletionRequest, CompletionResponse, TokenUsage};
use deskmate_core::{AdapterType, DeskmateError, HealthStatus};

#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Failure(String),
}

/// Replays queued replies in order and records every request it receives.
///
/// An exhausted script answers `"mock response"`.
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    shutdowns: AtomicUsize,
}

impl MockProvider {
    /// Empty script.
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            script: Arc::new(Mutex::new(
                responses.into_iter().map(Scripted::Text).collect(),
            )),
            requests: Arc::new(Mutex::new(Vec::new())),
            shutdowns: AtomicUsize::new(0),
        }
    }

    /// Appends a successful reply.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Text(text.into()));
    }

    /// Queue a provider error; the call that pops it fails.
    pub async fn add_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Failure(message.into()));
    }

    /// All requests received so far, in order.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Scripted {
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Scripted::Text("mock response".to_string()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskmateError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DeskmateError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, DeskmateError> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| "mock-model".to_string());
        self.requests.lock().await.push(request);

        match self.next().await {
            Scripted::Text(content) => Ok(CompletionResponse {
                id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
                content,
                model,
                finish_reason: Some("stop".to_string()),
                usage: TokenUsage {
                    input_tokens: 10,
                    output_tokens: 20,
                },
            }),
            Scripted::Failure(message) => Err(DeskmateError::Provider {
                message,
                source: None,
            }),
        }
    }
}
