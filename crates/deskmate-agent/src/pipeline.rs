// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-query support pipeline.
//!
//! validate -> classify -> score sentiment -> route -> (retrieve + generate | escalate)
//!
//! The agent only holds shared read-only state, so one instance serves any
//! number of concurrent requests.

use std::sync::Arc;
use std::time::Instant;

use deskmate_config::DeskmateConfig;
use deskmate_core::{
    AdapterType, Category, DeskmateError, HealthStatus, PluginAdapter, ProviderAdapter, Route,
    Sentiment,
};
use deskmate_knowledge::{RetrievedSnippet, Retriever};
use deskmate_router::{route, Classifier, SentimentScorer};
use tracing::{debug, info, warn};

use crate::responder::Responder;

/// Everything the pipeline decided and produced for one query.
#[derive(Debug, Clone)]
pub struct SupportOutcome {
    pub query: String,
    pub category: Category,
    pub sentiment: Sentiment,
    pub route: Route,
    pub response: String,
    pub snippets: Vec<RetrievedSnippet>,
    pub grounded: bool,
}

/// Rejects blank queries and queries longer than `max_len` characters.
pub fn validate_query(query: &str, max_len: usize) -> Result<(), DeskmateError> {
    if query.chars().count() > max_len {
        return Err(DeskmateError::InvalidQuery(format!(
            "Query too long. Maximum length is {max_len} characters."
        )));
    }
    if query.trim().is_empty() {
        return Err(DeskmateError::InvalidQuery(
            "Query cannot be empty.".to_string(),
        ));
    }
    Ok(())
}

/// Result of one adapter's health check.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterHealth {
    pub name: String,
    pub adapter_type: AdapterType,
    pub version: String,
    pub status: HealthStatus,
}

impl AdapterHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

async fn check<A: PluginAdapter + ?Sized>(adapter: &A) -> AdapterHealth {
    let status = match adapter.health_check().await {
        Ok(status) => status,
        Err(e) => HealthStatus::Unhealthy(e.to_string()),
    };
    AdapterHealth {
        name: adapter.name().to_string(),
        adapter_type: adapter.adapter_type(),
        version: adapter.version().to_string(),
        status,
    }
}

/// Runs the classify / score / route / respond workflow.
pub struct SupportAgent {
    provider: Arc<dyn ProviderAdapter>,
    classifier: Classifier,
    scorer: SentimentScorer,
    responder: Responder,
    max_query_length: usize,
}

impl SupportAgent {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        retriever: Arc<Retriever>,
        config: &DeskmateConfig,
    ) -> Self {
        let temperature = config.llm.temperature;
        Self {
            classifier: Classifier::new(provider.clone(), temperature),
            scorer: SentimentScorer::new(provider.clone(), temperature),
            responder: Responder::new(provider.clone(), retriever, temperature),
            provider,
            max_query_length: config.server.max_query_length,
        }
    }

    pub fn retriever(&self) -> &Arc<Retriever> {
        self.responder.retriever()
    }

    pub fn max_query_length(&self) -> usize {
        self.max_query_length
    }

    /// Health of the completion provider and the embedder, in that order.
    pub async fn adapter_health(&self) -> Vec<AdapterHealth> {
        let embedder = self.retriever().embedder();
        vec![check(self.provider.as_ref()).await, check(embedder.as_ref()).await]
    }

    /// Releases adapter resources. Failures are logged, not returned.
    pub async fn shutdown(&self) {
        if let Err(e) = self.provider.shutdown().await {
            warn!(adapter = self.provider.name(), error = %e, "adapter shutdown failed");
        }
        let embedder = self.retriever().embedder();
        if let Err(e) = embedder.shutdown().await {
            warn!(adapter = embedder.name(), error = %e, "adapter shutdown failed");
        }
        debug!("adapters shut down");
    }

    /// Handles one query end to end.
    ///
    /// Invalid queries fail with [`DeskmateError::InvalidQuery`] before any
    /// model call. Provider failures in any stage propagate.
    pub async fn handle(&self, query: &str) -> Result<SupportOutcome, DeskmateError> {
        validate_query(query, self.max_query_length)?;
        let started = Instant::now();

        let classification = self.classifier.classify(query).await?;
        let sentiment = self.scorer.score(query).await?;
        let destination = route(classification.category, sentiment.sentiment);

        let reply = self.responder.respond(destination, query).await?;

        info!(
            category = %classification.category,
            sentiment = %sentiment.sentiment,
            route = %destination,
            grounded = reply.grounded,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query handled"
        );
        debug!(response_len = reply.text.len(), "reply ready");

        Ok(SupportOutcome {
            query: query.to_string(),
            category: classification.category,
            sentiment: sentiment.sentiment,
            route: destination,
            response: reply.text,
            snippets: reply.snippets,
            grounded: reply.grounded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_queries_are_rejected() {
        for query in ["", "   ", "\n\t"] {
            let err = validate_query(query, 500).unwrap_err();
            assert_eq!(err.to_string(), "Query cannot be empty.");
            assert!(err.is_client_error());
        }
    }

    #[test]
    fn overlong_query_is_rejected_with_limit() {
        let query = "a".repeat(501);
        let err = validate_query(&query, 500).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Query too long. Maximum length is 500 characters."
        );
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let query = "é".repeat(500);
        assert!(query.len() > 500);
        assert!(validate_query(&query, 500).is_ok());
    }

    #[test]
    fn query_at_limit_is_accepted() {
        assert!(validate_query(&"a".repeat(500), 500).is_ok());
        assert!(validate_query("What payment methods do you support?", 500).is_ok());
    }
}
