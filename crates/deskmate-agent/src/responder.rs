// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply generation: grounded category handlers and human escalation.

use std::sync::Arc;

use deskmate_core::types::CompletionRequest;
use deskmate_core::{Category, DeskmateError, ProviderAdapter, Route};
use deskmate_knowledge::{RetrievedSnippet, Retriever};
use tracing::{info, warn};

/// Fixed reply for escalated queries. No model call is made.
pub const ESCALATION_MESSAGE: &str = "We sincerely apologize for any frustration or inconvenience you've experienced. Your concern is very important to us, and we want to ensure you receive the best possible support. \n\nA member of our customer success team will reach out to you within the next 2 hours to address your issue personally. In the meantime, if you need immediate assistance, please contact us at support@company.com or call our priority support line at 1-800-SUPPORT.\n\nThank you for your patience and for bringing this to our attention.";

const TECHNICAL_PROMPT: &str = "You are a technical support specialist with deep expertise in our platform.

Write a clear, detailed technical support response to the customer query below. Use the retrieved knowledge base information to give accurate, specific guidance.

Guidelines:
- Be precise and technical while staying clear and understandable
- Include concrete examples, code snippets, or configuration details when relevant
- Reference documentation sources when applicable
- If the retrieved information does not fully answer the question, say what you know and suggest next steps or further resources
- Keep the response professional and helpful

Retrieved Knowledge Base Information:
{retrieved_content}

Customer Query:
{customer_query}

Technical Support Response:";

const BILLING_PROMPT: &str = "You are a billing support specialist who helps customers with financial matters.

Write a clear, detailed billing support response to the customer query below. Use the retrieved knowledge base information to answer accurately about pricing, payments, invoices, refunds, or subscriptions.

Guidelines:
- Be clear about pricing, payment terms, and policies
- Include specific details such as pricing tiers, payment methods, and timeframes
- Be empathetic and helpful when discussing refunds or disputes
- Reference official policies when applicable
- Direct account-specific issues to the appropriate channel
- Keep the response professional and reassuring

Retrieved Knowledge Base Information:
{retrieved_content}

Customer Query:
{customer_query}

Billing Support Response:";

const GENERAL_PROMPT: &str = "You are a customer support representative helping customers with general inquiries.

Write a clear, helpful response to the customer query below. Use the retrieved knowledge base information to answer accurately about the company, its policies, support channels, or other general questions.

Guidelines:
- Be friendly, professional, and helpful
- Provide complete and accurate information
- Include relevant links or contact information when appropriate
- If the question is outside your knowledge, point the customer to the right resource
- Keep the response concise but thorough

Retrieved Knowledge Base Information:
{retrieved_content}

Customer Query:
{customer_query}

Support Response:";

/// Text used in place of retrieved content when nothing relevant was found.
pub fn fallback_text(category: Category) -> &'static str {
    match category {
        Category::Technical => "No specific documentation found for this query.",
        Category::Billing => "No specific billing information found for this query.",
        Category::General => "No specific information found for this query.",
    }
}

/// Renders snippets as `[Source: ...]` blocks separated by blank lines.
pub fn format_snippets(snippets: &[RetrievedSnippet]) -> String {
    snippets
        .iter()
        .map(|s| format!("[Source: {}]\n{}", s.document.source(), s.document.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the grounded generation prompt for a category handler.
pub fn handler_prompt(category: Category, retrieved_content: &str, query: &str) -> String {
    let template = match category {
        Category::Technical => TECHNICAL_PROMPT,
        Category::Billing => BILLING_PROMPT,
        Category::General => GENERAL_PROMPT,
    };
    fill_template(template, retrieved_content, query)
}

/// Substitutes both placeholders in one scan of the template, so braces in the
/// inserted text are never treated as placeholders.
fn fill_template(template: &str, retrieved_content: &str, query: &str) -> String {
    let mut out = String::with_capacity(template.len() + retrieved_content.len() + query.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        if let Some(after) = tail.strip_prefix("{retrieved_content}") {
            out.push_str(retrieved_content);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{customer_query}") {
            out.push_str(query);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// A generated (or fixed) reply and the evidence behind it.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub snippets: Vec<RetrievedSnippet>,
    /// True when at least one knowledge-base snippet backed the reply.
    pub grounded: bool,
}

/// Produces replies for routed queries.
pub struct Responder {
    provider: Arc<dyn ProviderAdapter>,
    retriever: Arc<Retriever>,
    temperature: f32,
}

impl Responder {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        retriever: Arc<Retriever>,
        temperature: f32,
    ) -> Self {
        Self {
            provider,
            retriever,
            temperature,
        }
    }

    pub fn retriever(&self) -> &Arc<Retriever> {
        &self.retriever
    }

    pub async fn respond(&self, route: Route, query: &str) -> Result<Reply, DeskmateError> {
        let Some(category) = route.category() else {
            return Ok(escalate());
        };

        let snippets = self.retriever.retrieve(query, Some(category)).await;
        let retrieved_content = if snippets.is_empty() {
            fallback_text(category).to_string()
        } else {
            format_snippets(&snippets)
        };

        let request = CompletionRequest::from_prompt(
            handler_prompt(category, &retrieved_content, query),
            self.temperature,
        );
        let response = self.provider.complete(request).await?;

        info!(
            route = %route,
            snippets = snippets.len(),
            "response generated"
        );
        Ok(Reply {
            text: response.content.trim().to_string(),
            grounded: !snippets.is_empty(),
            snippets,
        })
    }
}

fn escalate() -> Reply {
    warn!("escalating negative-sentiment query to a human agent");
    Reply {
        text: ESCALATION_MESSAGE.to_string(),
        snippets: Vec::new(),
        grounded: false,
    }
}
