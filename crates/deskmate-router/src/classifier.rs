// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query category classification via a single hosted-model call.

use std::sync::Arc;

use deskmate_core::types::CompletionRequest;
use deskmate_core::{Category, DeskmateError, ProviderAdapter};
use tracing::{info, warn};

use crate::LABEL_MAX_TOKENS;

const CATEGORY_PROMPT: &str = "You are a customer support query classifier. Sort the incoming customer query into exactly one of these categories:

1. Technical: technical issues, integrations, APIs, SDKs, deployment, infrastructure, performance, security, or any other technology topic.

2. Billing: pricing, payments, invoices, subscriptions, refunds, upgrades, downgrades, or any other financial matter.

3. General: company information, support channels, policies, general questions, or anything that is neither Technical nor Billing.

Reply with ONLY the category name (Technical, Billing, or General). Do not add any explanation.

Customer Query:
{customer_query}

Category:";

/// Result of classifying a single query.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub category: Category,
    /// The model's raw answer, trimmed.
    pub raw: String,
    /// True when the raw answer was unrecognized and `General` was substituted.
    pub defaulted: bool,
}

impl ClassificationResult {
    /// Interprets a raw model answer, defaulting to `General`.
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        match Category::from_label(&raw) {
            Some(category) => Self {
                category,
                raw,
                defaulted: false,
            },
            None => Self {
                category: Category::General,
                raw,
                defaulted: true,
            },
        }
    }
}

/// Builds the classification prompt for a query.
pub fn category_prompt(query: &str) -> String {
    CATEGORY_PROMPT.replace("{customer_query}", query)
}

/// LLM-backed query classifier.
pub struct Classifier {
    provider: Arc<dyn ProviderAdapter>,
    temperature: f32,
}

impl Classifier {
    pub fn new(provider: Arc<dyn ProviderAdapter>, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
        }
    }

    /// Classifies a query into Technical, Billing, or General.
    ///
    /// An unrecognized answer becomes `General`; a failed call is returned as an error.
    pub async fn classify(&self, query: &str) -> Result<ClassificationResult, DeskmateError> {
        let request = CompletionRequest::from_prompt(category_prompt(query), self.temperature)
            .with_max_tokens(LABEL_MAX_TOKENS);
        let response = self.provider.complete(request).await?;

        let result = ClassificationResult::from_raw(&response.content);
        if result.defaulted {
            warn!(raw = %result.raw, "invalid category, defaulting to General");
        }
        info!(category = %result.category, "query classified");
        Ok(result)
    }
}
