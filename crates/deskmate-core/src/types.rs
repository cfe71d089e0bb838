// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the adapters, the router, and the support pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier for a chat session.
///
/// Sessions are not persisted; the id is echoed back so clients can
/// correlate requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generates a fresh random (v4 UUID) session id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Uses the client-supplied id when present and non-blank, otherwise generates one.
    pub fn from_optional(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(id) if !id.is_empty() => Self(id.to_string()),
            _ => Self::generate(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    /// Not operational, with the reason.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Embedding,
}

/// Category assigned to a customer query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    Technical,
    Billing,
    General,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Technical, Category::Billing, Category::General];

    /// Parses a label produced by a model, tolerating surrounding whitespace,
    /// quotes, markdown emphasis, and trailing punctuation.
    pub fn from_label(raw: &str) -> Option<Self> {
        clean_label(raw).parse().ok()
    }

    /// Lowercase tag used by knowledge-base document metadata.
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Technical => "technical",
            Category::Billing => "billing",
            Category::General => "general",
        }
    }
}

/// Emotional tone of a customer query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    /// Parses a label produced by a model. See [`Category::from_label`].
    pub fn from_label(raw: &str) -> Option<Self> {
        clean_label(raw).parse().ok()
    }
}

/// Destination chosen by the router for a query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Hand off to a human with the fixed escalation message.
    EscalateToHuman,
    Technical,
    Billing,
    General,
}

impl Route {
    /// The knowledge category searched by this route, if any.
    pub fn category(&self) -> Option<Category> {
        match self {
            Route::EscalateToHuman => None,
            Route::Technical => Some(Category::Technical),
            Route::Billing => Some(Category::Billing),
            Route::General => Some(Category::General),
        }
    }

    pub fn is_escalation(&self) -> bool {
        matches!(self, Route::EscalateToHuman)
    }
}

fn clean_label(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c: char| !c.is_ascii_alphanumeric())
}

// --- Provider types ---

/// A single chat message sent to an LLM provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A completion request to an LLM provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model override; `None` uses the provider's configured model.
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Builds a request containing a single user prompt.
    pub fn from_prompt(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: None,
            messages: vec![ChatMessage::user(prompt)],
            temperature,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Token usage reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A completed response from an LLM provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub finish_reason: Option<String>,
    pub usage: TokenUsage,
}

// --- Embedding types ---

/// Input for an embedding adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from an embedding adapter: one vector per input text, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}
