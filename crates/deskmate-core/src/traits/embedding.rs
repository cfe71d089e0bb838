// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::DeskmateError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EmbeddingInput, EmbeddingOutput};

/// Adapter for generating vector embeddings from text.
///
/// Powers both knowledge-base indexing and query-time retrieval.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Generates embeddings for the given input, one vector per text.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, DeskmateError>;

    /// The embedding model identifier, used to fingerprint persisted indexes.
    fn model(&self) -> &str;
}
