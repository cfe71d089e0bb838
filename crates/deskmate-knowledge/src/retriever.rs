// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query-time retrieval over the knowledge index.
//!
//! The retriever embeds the query, scores every indexed document by cosine
//! similarity, and returns the best matches above the configured threshold.
//! Retrieval problems degrade to an empty result; they never fail a request.

use std::sync::Arc;

use deskmate_config::model::RetrievalConfig;
use deskmate_core::types::EmbeddingInput;
use deskmate_core::{Category, DeskmateError, EmbeddingAdapter};
use tracing::{debug, warn};

use crate::index::VectorIndex;
use crate::types::RetrievedSnippet;

/// Connection state of the knowledge index, as reported by health checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    Connected { documents: usize },
    Disconnected,
}

impl IndexStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, IndexStatus::Connected { .. })
    }

    /// Indexed document count; zero when disconnected.
    pub fn documents(&self) -> usize {
        match self {
            IndexStatus::Connected { documents } => *documents,
            IndexStatus::Disconnected => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexStatus::Connected { .. } => "connected",
            IndexStatus::Disconnected => "disconnected",
        }
    }
}

/// Similarity retriever over an optional, immutable index.
pub struct Retriever {
    index: Option<Arc<VectorIndex>>,
    embedder: Arc<dyn EmbeddingAdapter>,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            index: Some(index),
            embedder,
            config,
        }
    }

    /// A retriever with no index; every query returns nothing.
    pub fn disconnected(embedder: Arc<dyn EmbeddingAdapter>, config: RetrievalConfig) -> Self {
        Self {
            index: None,
            embedder,
            config,
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingAdapter> {
        &self.embedder
    }

    pub fn status(&self) -> IndexStatus {
        match &self.index {
            Some(index) => IndexStatus::Connected {
                documents: index.len(),
            },
            None => IndexStatus::Disconnected,
        }
    }

    /// Returns up to `top_k` snippets scoring at least the threshold, best first.
    ///
    /// With a category, only documents tagged with that category are searched.
    pub async fn retrieve(&self, query: &str, category: Option<Category>) -> Vec<RetrievedSnippet> {
        let Some(index) = &self.index else {
            warn!("knowledge index unavailable, skipping retrieval");
            return Vec::new();
        };

        let query_embedding = match self.embed_query(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(error = %e, "query embedding failed, skipping retrieval");
                return Vec::new();
            }
        };

        let snippets = index.search(
            &query_embedding,
            self.config.top_k,
            self.config.score_threshold,
            category.map(|c| c.tag()),
        );
        debug!(
            category = category.map(|c| c.tag()).unwrap_or("any"),
            hits = snippets.len(),
            top_score = snippets.first().map(|s| s.score).unwrap_or(0.0),
            "retrieval complete"
        );
        snippets
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DeskmateError> {
        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![query.to_string()],
            })
            .await?;

        output.embeddings.into_iter().next().ok_or_else(|| {
            DeskmateError::Internal("embedding returned no results".to_string())
        })
    }
}
