// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the `deskmate` binary against a mock OpenAI API.
//!
//! Each test writes an isolated config, knowledge base, and index directory
//! into a temp dir and points the binary at a wiremock server.

use std::path::{Path, PathBuf};
use std::process::Output;

use serde_json::{json, Value};
use tokio::process::Command;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const DOCUMENTS: &str = r#"{"documents": [
    {"text": "Deploy on-premises with Docker or Kubernetes.", "metadata": {"category": "technical", "source": "deployment_guide.md"}},
    {"text": "Supported payment methods: credit cards, PayPal, and bank transfers.", "metadata": {"category": "billing", "source": "billing_faq.md"}},
    {"text": "Support is available 24/7 by email and chat.", "metadata": {"category": "general", "source": "support_channels.md"}}
]}"#;

/// Embeds each input as a keyword-presence vector.
struct KeywordEmbeddings;

impl Respond for KeywordEmbeddings {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let data: Vec<Value> = body["input"]
            .as_array()
            .unwrap()
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let text = text.as_str().unwrap().to_lowercase();
                let hit = |word: &str| if text.contains(word) { 1.0 } else { 0.0 };
                json!({
                    "index": index,
                    "embedding": [hit("payment"), hit("deploy"), hit("support"), 0.1]
                })
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": data,
            "model": "text-embedding-3-small"
        }))
    }
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5}
    }))
}

async fn mock_openai(category: &str, sentiment: &str, answer: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(KeywordEmbeddings)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Category:"))
        .respond_with(completion(category))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Sentiment:"))
        .respond_with(completion(sentiment))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Support Response:"))
        .respond_with(completion(answer))
        .mount(&server)
        .await;
    server
}

fn write_config(dir: &Path, server: &MockServer) -> PathBuf {
    let docs = dir.join("support_documents.json");
    std::fs::write(&docs, DOCUMENTS).unwrap();
    let config = format!(
        r#"
[llm]
api_key = "sk-test"
base_url = "{base}"
model = "gpt-4o"

[embedding]
model = "text-embedding-3-small"
batch_size = 2

[vector_store]
path = "{store}"
collection = "support_docs"
documents_path = "{docs}"

[logging]
level = "info"
file = "{log}"
"#,
        base = server.uri(),
        store = dir.join("kb").display(),
        docs = docs.display(),
        log = dir.join("logs").join("deskmate.log").display(),
    );
    let path = dir.join("deskmate.toml");
    std::fs::write(&path, config).unwrap();
    path
}

async fn deskmate(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_deskmate"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .await
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "deskmate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

async fn requests_to(server: &MockServer, endpoint: &str) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == endpoint)
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect()
}

#[tokio::test]
async fn ask_answers_billing_query_with_retrieved_context() {
    let server = mock_openai(
        "Billing",
        "Neutral",
        "We accept credit cards, PayPal, and bank transfers.",
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server);

    let output = deskmate(
        &config,
        &["ask", "What payment methods do you support?", "--json"],
    )
    .await;
    let body = stdout_json(&output);

    assert_eq!(body["category"], "Billing");
    assert_eq!(body["sentiment"], "Neutral");
    assert_eq!(body["route"], "billing");
    assert_eq!(
        body["response"],
        "We accept credit cards, PayPal, and bank transfers."
    );
    assert_eq!(body["sources"], json!(["billing_faq.md"]));

    let chats = requests_to(&server, "/chat/completions").await;
    assert_eq!(chats.len(), 3);
    assert!(chats[2].contains("[Source: billing_faq.md]"));

    let log = std::fs::read_to_string(dir.path().join("logs").join("deskmate.log")).unwrap();
    assert!(log.contains("query handled"), "log file: {log}");
    assert!(log.contains("route=billing"));
}

#[tokio::test]
async fn ask_escalates_negative_query_without_generation() {
    let server = mock_openai("General", "Negative", "unused").await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server);

    let output = deskmate(
        &config,
        &["ask", "I am extremely frustrated with your service!", "--json"],
    )
    .await;
    let body = stdout_json(&output);

    assert_eq!(body["sentiment"], "Negative");
    assert_eq!(body["route"], "escalate_to_human");
    assert!(body["response"]
        .as_str()
        .unwrap()
        .contains("within the next 2 hours"));
    assert_eq!(requests_to(&server, "/chat/completions").await.len(), 2);
}

#[tokio::test]
async fn index_builds_once_then_reuses_persisted_vectors() {
    let server = mock_openai("General", "Neutral", "unused").await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server);

    let first = stdout_json(&deskmate(&config, &["index", "--json"]).await);
    assert_eq!(first["documents"], 3);
    assert_eq!(first["dimensions"], 4);
    assert_eq!(first["reused"], false);
    assert_eq!(first["collection"], "support_docs");

    // 3 documents at batch size 2
    assert_eq!(requests_to(&server, "/embeddings").await.len(), 2);

    let second = stdout_json(&deskmate(&config, &["index", "--json"]).await);
    assert_eq!(second["reused"], true);
    assert_eq!(requests_to(&server, "/embeddings").await.len(), 2);
    assert!(dir.path().join("kb").join("index.db").exists());
}

#[tokio::test]
async fn unknown_config_key_exits_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("deskmate.toml");
    std::fs::write(&config, "[llm]\nmodle = \"gpt-4o\"\n").unwrap();

    let output = deskmate(&config, &["status", "--json"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[tokio::test]
async fn status_reports_offline_server() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("deskmate.toml");
    std::fs::write(
        &config,
        format!("[server]\nhost = \"127.0.0.1\"\nport = {port}\n"),
    )
    .unwrap();

    let body = stdout_json(&deskmate(&config, &["status", "--json"]).await);
    assert_eq!(body["running"], false);
    assert_eq!(body["health"], "not running");
}
