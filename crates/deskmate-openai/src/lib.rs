// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI adapters for the Deskmate support service.
//!
//! [`OpenAiProvider`] implements [`ProviderAdapter`] over the chat-completions
//! endpoint and [`OpenAiEmbedder`] implements [`EmbeddingAdapter`] over the
//! embeddings endpoint. Both share one [`OpenAiClient`].

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use deskmate_config::model::{EmbeddingConfig, LlmConfig};
use deskmate_core::types::{
    CompletionRequest, CompletionResponse, EmbeddingInput, EmbeddingOutput, TokenUsage,
};
use deskmate_core::{
    AdapterType, DeskmateError, EmbeddingAdapter, HealthStatus, PluginAdapter, ProviderAdapter,
};
use tracing::{debug, info};

pub use client::OpenAiClient;
use types::{ApiMessage, ChatCompletionRequest, EmbeddingRequest};

/// Environment variable consulted when `llm.api_key` is not configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Chat-completion provider backed by the OpenAI API.
pub struct OpenAiProvider {
    client: OpenAiClient,
    model: String,
    max_tokens: u32,
}

impl OpenAiProvider {
    /// Creates a provider from configuration.
    ///
    /// The API key comes from `llm.api_key`, falling back to `OPENAI_API_KEY`.
    pub fn new(config: &LlmConfig) -> Result<Self, DeskmateError> {
        let client = build_client(config)?;

        info!(
            model = config.model.as_str(),
            base_url = client.base_url(),
            "OpenAI provider initialized"
        );

        Ok(Self::with_client(client, config.model.clone(), config.max_tokens))
    }

    /// Creates a provider around an existing client.
    pub fn with_client(client: OpenAiClient, model: String, max_tokens: u32) -> Self {
        Self {
            client,
            model,
            max_tokens,
        }
    }

    /// The default model used when a request does not override it.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_api_request(&self, request: CompletionRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: request.model.unwrap_or_else(|| self.model.clone()),
            messages: request
                .messages
                .into_iter()
                .map(|m| ApiMessage {
                    role: m.role,
                    content: Some(m.content),
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: Some(request.max_tokens.unwrap_or(self.max_tokens)),
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskmateError> {
        // Avoid spending tokens on health checks.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DeskmateError> {
        debug!("OpenAI provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, DeskmateError> {
        let api_request = self.to_api_request(request);
        let response = self.client.chat_completion(&api_request).await?;

        let choice = response
            .choices
            .into_iter()
            .min_by_key(|c| c.index)
            .ok_or_else(|| DeskmateError::Provider {
                message: "completion response contained no choices".into(),
                source: None,
            })?;

        let usage = response
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        debug!(
            model = response.model.as_str(),
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "completion finished"
        );

        Ok(CompletionResponse {
            id: response.id,
            content: choice.message.content.unwrap_or_default().trim().to_string(),
            model: response.model,
            finish_reason: choice.finish_reason,
            usage,
        })
    }
}

/// Embedding adapter backed by the OpenAI embeddings endpoint.
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
}

impl OpenAiEmbedder {
    /// Creates an embedder sharing the LLM connection settings.
    pub fn new(llm: &LlmConfig, embedding: &EmbeddingConfig) -> Result<Self, DeskmateError> {
        let client = build_client(llm)?;
        info!(model = embedding.model.as_str(), "OpenAI embedder initialized");
        Ok(Self::with_client(client, embedding.model.clone()))
    }

    pub fn with_client(client: OpenAiClient, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai-embeddings"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskmateError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DeskmateError> {
        debug!("OpenAI embedder shutting down");
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, DeskmateError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: vec![],
                dimensions: 0,
            });
        }

        let expected = input.texts.len();
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: input.texts,
        };
        let mut response = self.client.create_embeddings(&request).await?;

        if response.data.len() != expected {
            return Err(DeskmateError::Provider {
                message: format!(
                    "embeddings response returned {} vectors for {expected} inputs",
                    response.data.len()
                ),
                source: None,
            });
        }

        // The API does not guarantee ordering; restore input order.
        response.data.sort_by_key(|d| d.index);

        let embeddings: Vec<Vec<f32>> = response
            .data
            .into_iter()
            .map(|d| l2_normalize(d.embedding))
            .collect();
        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);

        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn build_client(config: &LlmConfig) -> Result<OpenAiClient, DeskmateError> {
    let api_key = resolve_api_key(&config.api_key)?;
    OpenAiClient::new(
        &api_key,
        &config.base_url,
        Duration::from_secs(config.timeout_secs),
    )
}

/// Resolves the API key from config, falling back to the `OPENAI_API_KEY` env var.
pub fn resolve_api_key(config_key: &Option<String>) -> Result<String, DeskmateError> {
    if let Some(key) = config_key
        && !key.trim().is_empty()
    {
        return Ok(key.trim().to_string());
    }

    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(DeskmateError::Config(format!(
            "OpenAI API key not found. Set llm.api_key in config, DESKMATE_LLM_API_KEY, or the {API_KEY_ENV} environment variable."
        ))),
    }
}

/// Scales a vector to unit length so cosine similarity reduces to a dot product.
pub fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}
