// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `deskmate ask` command: one query through the full pipeline, no server.

use std::sync::Arc;

use deskmate_agent::{SupportAgent, SupportOutcome};
use deskmate_config::DeskmateConfig;
use deskmate_core::DeskmateError;
use deskmate_openai::{OpenAiEmbedder, OpenAiProvider};
use serde::Serialize;

use crate::index::connect_retriever;

/// Structured output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct AskOutput {
    pub query: String,
    pub category: String,
    pub sentiment: String,
    pub route: String,
    pub response: String,
    pub sources: Vec<String>,
}

impl From<SupportOutcome> for AskOutput {
    fn from(outcome: SupportOutcome) -> Self {
        Self {
            sources: outcome
                .snippets
                .iter()
                .map(|s| s.document.source().to_string())
                .collect(),
            query: outcome.query,
            category: outcome.category.to_string(),
            sentiment: outcome.sentiment.to_string(),
            route: outcome.route.to_string(),
            response: outcome.response,
        }
    }
}

fn render_plain(output: &AskOutput) -> String {
    let mut text = format!(
        "Category:  {}\nSentiment: {}\nRoute:     {}\n",
        output.category, output.sentiment, output.route
    );
    if !output.sources.is_empty() {
        text.push_str(&format!("Sources:   {}\n", output.sources.join(", ")));
    }
    text.push('\n');
    text.push_str(&output.response);
    text
}

/// Run the `deskmate ask` command.
pub async fn run_ask(config: &DeskmateConfig, query: &str, json: bool) -> Result<(), DeskmateError> {
    let provider = Arc::new(OpenAiProvider::new(&config.llm)?);
    let embedder = Arc::new(OpenAiEmbedder::new(&config.llm, &config.embedding)?);
    let retriever = Arc::new(connect_retriever(config, embedder).await);
    let agent = SupportAgent::new(provider, retriever, config);

    let output = AskOutput::from(agent.handle(query).await?);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        println!("{}", render_plain(&output));
    }
    Ok(())
}
