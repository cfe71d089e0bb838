// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `TestHarness` assembles a complete support agent with mock adapters,
//! a temp SQLite vector store, and a small knowledge base. Provides
//! `handle()` to drive the full pipeline in tests.

use std::sync::Arc;

use deskmate_agent::{SupportAgent, SupportOutcome};
use deskmate_config::DeskmateConfig;
use deskmate_core::DeskmateError;
use deskmate_knowledge::types::DocumentMetadata;
use deskmate_knowledge::{
    IndexBuildReport, KnowledgeBase, KnowledgeDocument, Retriever, VectorIndex, VectorStore,
};

use crate::mock_embedder::MockEmbedder;
use crate::mock_provider::MockProvider;

/// Builds a knowledge document with a category and source.
pub fn document(text: &str, category: &str, source: &str) -> KnowledgeDocument {
    KnowledgeDocument {
        id: String::new(),
        text: text.to_string(),
        metadata: DocumentMetadata {
            category: Some(category.to_string()),
            source: Some(source.to_string()),
            extra: Default::default(),
        },
    }
}

/// A small mixed-category knowledge base used by default.
pub fn sample_documents() -> Vec<KnowledgeDocument> {
    vec![
        document(
            "Deskmate supports on-premises deployment with Docker and Kubernetes for enterprise customers.",
            "technical",
            "deployment_guide.md",
        ),
        document(
            "Our REST API uses bearer tokens. Rotate API keys from the dashboard security page.",
            "technical",
            "api_reference.md",
        ),
        document(
            "We support payment methods including credit cards, PayPal, and bank transfers.",
            "billing",
            "billing_faq.md",
        ),
        document(
            "Refunds are issued within 14 days of a cancelled subscription.",
            "billing",
            "refund_policy.md",
        ),
        document(
            "Our support team is available 24/7 by email, chat, and phone.",
            "general",
            "support_channels.md",
        ),
    ]
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    documents: Vec<KnowledgeDocument>,
    config: DeskmateConfig,
    with_index: bool,
    embedder: Option<Arc<MockEmbedder>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            documents: sample_documents(),
            config: DeskmateConfig::default(),
            with_index: true,
            embedder: None,
        }
    }

    /// Set mock provider responses, consumed in call order
    /// (classifier, sentiment, generation).
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Replace the default knowledge base.
    pub fn with_documents(mut self, documents: Vec<KnowledgeDocument>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_config(mut self, config: DeskmateConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a specific embedder (e.g. one that fails after indexing).
    pub fn with_embedder(mut self, embedder: Arc<MockEmbedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Skip building the index; the retriever reports disconnected.
    pub fn without_index(mut self) -> Self {
        self.with_index = false;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, DeskmateError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| DeskmateError::Storage { source: e.into() })?;

        let mut config = self.config;
        config.vector_store.path = temp_dir.path().display().to_string();

        let embedder = self
            .embedder
            .unwrap_or_else(|| Arc::new(MockEmbedder::new()));
        let provider = Arc::new(MockProvider::with_responses(self.responses));

        let (retriever, report) = if self.with_index {
            let store = VectorStore::open(config.vector_store.database_file()).await?;
            let kb = KnowledgeBase::from_documents(self.documents);
            let (index, report) = VectorIndex::build(
                &kb,
                embedder.as_ref(),
                Some(&store),
                &config.vector_store.collection,
                config.embedding.batch_size,
            )
            .await?;
            (
                Retriever::new(Arc::new(index), embedder.clone(), config.retrieval.clone()),
                Some(report),
            )
        } else {
            (
                Retriever::disconnected(embedder.clone(), config.retrieval.clone()),
                None,
            )
        };

        let agent = Arc::new(SupportAgent::new(
            provider.clone(),
            Arc::new(retriever),
            &config,
        ));

        Ok(TestHarness {
            agent,
            mock_provider: provider,
            embedder,
            config,
            index_report: report,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    pub agent: Arc<SupportAgent>,
    pub mock_provider: Arc<MockProvider>,
    pub embedder: Arc<MockEmbedder>,
    pub config: DeskmateConfig,
    /// `None` when built `without_index`.
    pub index_report: Option<IndexBuildReport>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Drives one query through the full pipeline.
    pub async fn handle(&self, query: &str) -> Result<SupportOutcome, DeskmateError> {
        self.agent.handle(query).await
    }

    /// The generation prompt sent for the most recent reply, if any.
    pub async fn last_prompt(&self) -> Option<String> {
        self.mock_provider
            .requests()
            .await
            .last()
            .and_then(|r| r.messages.last())
            .map(|m| m.content.clone())
    }
}
