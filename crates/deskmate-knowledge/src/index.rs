// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory vector index over the embedded knowledge base.

use deskmate_core::types::EmbeddingInput;
use deskmate_core::{DeskmateError, EmbeddingAdapter};
use tracing::{debug, info};

use crate::store::{StoredEmbedding, VectorStore};
use crate::types::{cosine_similarity, KnowledgeBase, RetrievedSnippet};

/// Outcome of building (or reloading) the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBuildReport {
    pub documents: usize,
    /// True when embeddings were loaded from the store instead of recomputed.
    pub reused: bool,
    pub dimensions: usize,
}

/// Embedded documents held in memory for brute-force cosine search.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<StoredEmbedding>,
    dimensions: usize,
}

impl VectorIndex {
    /// Builds the index from a knowledge base.
    ///
    /// When a store is given and it holds a collection whose fingerprint matches
    /// the current documents and embedding model, the stored vectors are reused.
    /// Otherwise every document is embedded in batches of `batch_size` and the
    /// result replaces the stored collection.
    pub async fn build(
        kb: &KnowledgeBase,
        embedder: &dyn EmbeddingAdapter,
        store: Option<&VectorStore>,
        collection: &str,
        batch_size: usize,
    ) -> Result<(Self, IndexBuildReport), DeskmateError> {
        let fingerprint = kb.fingerprint(embedder.model());

        if let Some(store) = store
            && store.collection_fingerprint(collection).await?.as_deref() == Some(fingerprint.as_str())
        {
            let entries = store.load_collection(collection).await?;
            if entries.len() == kb.len() {
                let index = Self::from_entries(entries);
                let report = IndexBuildReport {
                    documents: index.len(),
                    reused: true,
                    dimensions: index.dimensions,
                };
                info!(
                    collection,
                    documents = report.documents,
                    "reusing persisted knowledge index"
                );
                return Ok((index, report));
            }
            debug!(collection, "stored collection incomplete, re-embedding");
        }

        let batch_size = batch_size.max(1);
        let mut entries = Vec::with_capacity(kb.len());
        for batch in kb.documents().chunks(batch_size) {
            let output = embedder
                .embed(EmbeddingInput {
                    texts: batch.iter().map(|doc| doc.text.clone()).collect(),
                })
                .await?;

            if output.embeddings.len() != batch.len() {
                return Err(DeskmateError::Knowledge {
                    message: format!(
                        "embedder returned {} vectors for {} documents",
                        output.embeddings.len(),
                        batch.len()
                    ),
                    source: None,
                });
            }

            entries.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(output.embeddings)
                    .map(|(document, embedding)| StoredEmbedding {
                        document,
                        embedding,
                    }),
            );
        }

        if let Some(store) = store {
            store
                .replace_collection(collection, &fingerprint, embedder.model(), entries.clone())
                .await?;
        }

        let index = Self::from_entries(entries);
        let report = IndexBuildReport {
            documents: index.len(),
            reused: false,
            dimensions: index.dimensions,
        };
        info!(
            collection,
            documents = report.documents,
            dimensions = report.dimensions,
            "knowledge index built"
        );
        Ok((index, report))
    }

    pub fn from_entries(entries: Vec<StoredEmbedding>) -> Self {
        let dimensions = entries.first().map(|e| e.embedding.len()).unwrap_or(0);
        Self {
            entries,
            dimensions,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Returns up to `top_k` documents scoring at least `threshold`, best first.
    ///
    /// With a category filter, only documents tagged with that category
    /// (case-insensitive) are considered; untagged documents never match.
    pub fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        threshold: f32,
        category: Option<&str>,
    ) -> Vec<RetrievedSnippet> {
        let mut scored: Vec<RetrievedSnippet> = self
            .entries
            .iter()
            .filter(|entry| category.is_none_or(|tag| entry.document.has_category(tag)))
            .map(|entry| RetrievedSnippet {
                score: cosine_similarity(query_embedding, &entry.embedding),
                document: entry.document.clone(),
            })
            .filter(|snippet| snippet.score >= threshold)
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        scored
    }
}
