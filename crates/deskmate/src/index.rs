// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `deskmate index` command and the index bootstrap shared by `serve` and `ask`.

use std::sync::Arc;

use deskmate_config::DeskmateConfig;
use deskmate_core::{DeskmateError, EmbeddingAdapter};
use deskmate_knowledge::{IndexBuildReport, KnowledgeBase, Retriever, VectorIndex, VectorStore};
use deskmate_openai::OpenAiEmbedder;
use serde::Serialize;
use tracing::{info, warn};

/// Loads the documents and builds the index, reusing persisted vectors when current.
pub async fn build_index(
    config: &DeskmateConfig,
    embedder: &dyn EmbeddingAdapter,
) -> Result<(VectorIndex, IndexBuildReport), DeskmateError> {
    let kb = KnowledgeBase::load(&config.vector_store.documents_path).await?;
    if kb.is_empty() {
        return Err(DeskmateError::Knowledge {
            message: format!(
                "knowledge base {} contains no documents",
                config.vector_store.documents_path
            ),
            source: None,
        });
    }

    let store = VectorStore::open(config.vector_store.database_file()).await?;
    let built = VectorIndex::build(
        &kb,
        embedder,
        Some(&store),
        &config.vector_store.collection,
        config.embedding.batch_size,
    )
    .await;
    if let Err(e) = store.close().await {
        warn!(error = %e, "failed to close vector store");
    }
    built
}

/// Builds a retriever over the knowledge index.
///
/// Any failure leaves the retriever disconnected; the service still answers,
/// just without retrieved context.
pub async fn connect_retriever(
    config: &DeskmateConfig,
    embedder: Arc<dyn EmbeddingAdapter>,
) -> Retriever {
    match build_index(config, embedder.as_ref()).await {
        Ok((index, report)) => {
            info!(
                documents = report.documents,
                reused = report.reused,
                dimensions = report.dimensions,
                "knowledge index ready"
            );
            Retriever::new(Arc::new(index), embedder, config.retrieval.clone())
        }
        Err(e) => {
            warn!(error = %e, "knowledge index unavailable, answers will not be grounded");
            Retriever::disconnected(embedder, config.retrieval.clone())
        }
    }
}

/// Structured output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct IndexSummary {
    pub collection: String,
    pub documents: usize,
    pub dimensions: usize,
    pub reused: bool,
    pub database: String,
}

impl IndexSummary {
    fn new(config: &DeskmateConfig, report: IndexBuildReport) -> Self {
        Self {
            collection: config.vector_store.collection.clone(),
            documents: report.documents,
            dimensions: report.dimensions,
            reused: report.reused,
            database: config.vector_store.database_file().display().to_string(),
        }
    }
}

/// Run the `deskmate index` command.
pub async fn run_index(config: &DeskmateConfig, json: bool) -> Result<(), DeskmateError> {
    let embedder = OpenAiEmbedder::new(&config.llm, &config.embedding)?;
    let (_, report) = build_index(config, &embedder).await?;
    let summary = IndexSummary::new(config, report);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let action = if summary.reused {
            "up to date"
        } else {
            "rebuilt"
        };
        println!(
            "Index {action}: {} documents in collection '{}' ({} dimensions)",
            summary.documents, summary.collection, summary.dimensions
        );
        println!("Stored at {}", summary.database);
    }
    Ok(())
}
