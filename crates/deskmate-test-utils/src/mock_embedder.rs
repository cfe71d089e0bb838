// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic embedding adapter for tests.
//!
//! Texts are embedded as hashed bag-of-words vectors, so documents that share
//! words with a query score higher without any network access.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use deskmate_core::traits::adapter::PluginAdapter;
use deskmate_core::traits::embedding::EmbeddingAdapter;
use deskmate_core::types::{EmbeddingInput, EmbeddingOutput};
use deskmate_core::{AdapterType, DeskmateError, HealthStatus};

/// Default vector width.
pub const MOCK_DIMENSIONS: usize = 256;

/// A mock embedder producing L2-normalized hashed bag-of-words vectors.
pub struct MockEmbedder {
    dimensions: usize,
    model: String,
    failing: AtomicBool,
    calls: AtomicUsize,
    texts_embedded: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::with_model("mock-embedding")
    }

    /// A mock embedder reporting the given model name (changes index fingerprints).
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            dimensions: MOCK_DIMENSIONS,
            model: model.into(),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            texts_embedded: AtomicUsize::new(0),
        }
    }

    /// A mock embedder whose every call fails.
    pub fn failing() -> Self {
        let embedder = Self::new();
        embedder.set_failing(true);
        embedder
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `embed` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Total number of texts embedded across all calls.
    pub fn texts_embedded(&self) -> usize {
        self.texts_embedded.load(Ordering::SeqCst)
    }

    /// Embeds one text synchronously.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let slot = (fnv1a(token.as_bytes()) % self.dimensions as u64) as usize;
            vector[slot] += 1.0;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskmateError> {
        if self.failing.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("mock failure".to_string()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), DeskmateError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, DeskmateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DeskmateError::Provider {
                message: "mock embedder failure".to_string(),
                source: None,
            });
        }

        self.texts_embedded
            .fetch_add(input.texts.len(), Ordering::SeqCst);
        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| self.vector_for(t)).collect(),
            dimensions: self.dimensions,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
