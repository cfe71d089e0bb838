// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sentiment scoring via a single hosted-model call.

use std::sync::Arc;

use deskmate_core::types::CompletionRequest;
use deskmate_core::{DeskmateError, ProviderAdapter, Sentiment};
use tracing::{info, warn};

use crate::LABEL_MAX_TOKENS;

const SENTIMENT_PROMPT: &str = "You are a sentiment analysis expert. Judge the emotional tone of a customer query so support requests can be prioritized.

Classify the query below as exactly ONE of:

1. Positive: the customer is happy, satisfied, grateful, or complimentary.
   Examples: \"Thank you for the great service!\", \"I love this feature!\"

2. Neutral: the customer asks a straightforward question without strong emotion.
   Examples: \"What payment methods do you support?\", \"How do I integrate with AWS?\"

3. Negative: the customer is frustrated, angry, disappointed, or dissatisfied.
   Examples: \"This is terrible!\", \"I'm very frustrated\", \"This doesn't work at all\"

Reply with ONLY the sentiment (Positive, Neutral, or Negative). Do not add any explanation.

Customer Query:
{customer_query}

Sentiment:";

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    pub raw: String,
    /// True when the raw answer was unrecognized and `Neutral` was substituted.
    pub defaulted: bool,
}

impl SentimentResult {
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        match Sentiment::from_label(&raw) {
            Some(sentiment) => Self {
                sentiment,
                raw,
                defaulted: false,
            },
            None => Self {
                sentiment: Sentiment::Neutral,
                raw,
                defaulted: true,
            },
        }
    }
}

pub fn sentiment_prompt(query: &str) -> String {
    SENTIMENT_PROMPT.replace("{customer_query}", query)
}

/// LLM-backed sentiment scorer.
pub struct SentimentScorer {
    provider: Arc<dyn ProviderAdapter>,
    temperature: f32,
}

impl SentimentScorer {
    pub fn new(provider: Arc<dyn ProviderAdapter>, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
        }
    }

    /// Scores a query as Positive, Neutral, or Negative.
    pub async fn score(&self, query: &str) -> Result<SentimentResult, DeskmateError> {
        let request = CompletionRequest::from_prompt(sentiment_prompt(query), self.temperature)
            .with_max_tokens(LABEL_MAX_TOKENS);
        let response = self.provider.complete(request).await?;

        let result = SentimentResult::from_raw(&response.content);
        if result.defaulted {
            warn!(raw = %result.raw, "invalid sentiment, defaulting to Neutral");
        }
        info!(sentiment = %result.sentiment, "sentiment scored");
        Ok(result)
    }
}
