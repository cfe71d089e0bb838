// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI REST API.
//!
//! Provides [`OpenAiClient`] which handles request construction, bearer
//! authentication, and transient error retry for both chat completions and
//! embeddings.

use std::time::Duration;

use deskmate_core::DeskmateError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::{
    ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, EmbeddingRequest,
    EmbeddingResponse,
};

/// Default base URL for the OpenAI API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// HTTP client for OpenAI API communication.
///
/// Manages authentication headers, connection pooling, and retry logic
/// for transient errors (429, 500, 503, 529).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl OpenAiClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// * `api_key` - bearer token sent with every request
    /// * `base_url` - API root, e.g. `https://api.openai.com/v1`
    /// * `timeout` - per-request timeout
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, DeskmateError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| DeskmateError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| DeskmateError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Shortens the delay between retries (for tests against a mock server).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Returns the API root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a chat completion request and returns the full response.
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, DeskmateError> {
        self.post_json("chat/completions", request).await
    }

    /// Requests embeddings for a batch of texts.
    pub async fn create_embeddings(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResponse, DeskmateError> {
        self.post_json("embeddings", request).await
    }

    /// POSTs a JSON body, retrying once after a short delay on transient errors.
    async fn post_json<Req, Resp>(&self, endpoint: &str, body: &Req) -> Result<Resp, DeskmateError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{endpoint}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, endpoint, "retrying request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = match self.client.post(&url).json(body).send().await {
                Ok(response) => response,
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < self.max_retries => {
                    warn!(error = %e, endpoint, "request failed to complete, will retry");
                    last_error = Some(DeskmateError::Provider {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    });
                    continue;
                }
                Err(e) => {
                    return Err(DeskmateError::Provider {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    });
                }
            };

            let status = response.status();
            debug!(status = %status, attempt, endpoint, "response received");

            if status.is_success() {
                let text = response.text().await.map_err(|e| DeskmateError::Provider {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&text).map_err(|e| DeskmateError::Provider {
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let body = response.text().await.unwrap_or_default();

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, endpoint, "transient error, will retry");
                last_error = Some(DeskmateError::Provider {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            return Err(DeskmateError::Provider {
                message: describe_api_error(status, &body),
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| DeskmateError::Provider {
            message: format!("{endpoint} request failed after retries"),
            source: None,
        }))
    }
}

/// Formats an error body, preferring the structured `{"error": {...}}` envelope.
fn describe_api_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!(
            "OpenAI API error ({}, {}): {}",
            status.as_u16(),
            api_err.error.type_.as_deref().unwrap_or("unknown"),
            api_err.error.message
        ),
        Err(_) => format!("API returned {status}: {body}"),
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503 | 529)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiMessage;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> OpenAiClient {
        OpenAiClient::new("test-api-key", base_url, Duration::from_secs(5))
            .unwrap()
            .with_retry_delay(Duration::from_millis(10))
    }

    fn test_request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gpt-4o".into(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: Some("Hello".into()),
            }],
            temperature: 0.0,
            max_tokens: None,
        }
    }

    fn completion_body(id: &str, text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "object": "chat.completion",
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
        })
    }

    #[tokio::test]
    async fn chat_completion_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-4o", "temperature": 0.0})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("chatcmpl-1", "Billing")),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.chat_completion(&test_request()).await.unwrap();

        assert_eq!(result.id, "chatcmpl-1");
        assert_eq!(result.choices.len(), 1);
        assert_eq!(result.choices[0].message.content.as_deref(), Some("Billing"));
        assert_eq!(result.usage.map(|u| u.prompt_tokens), Some(10));
    }

    #[tokio::test]
    async fn chat_completion_retries_on_429() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "Rate limit reached", "type": "requests"}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("chatcmpl-retry", "ok")),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.chat_completion(&test_request()).await.unwrap();
        assert_eq!(result.id, "chatcmpl-retry");
    }

    #[tokio::test]
    async fn chat_completion_fails_on_400() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "The model `nope` does not exist", "type": "invalid_request_error"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .chat_completion(&test_request())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("invalid_request_error"), "got: {err}");
        assert!(err.contains("does not exist"), "got: {err}");
    }

    #[tokio::test]
    async fn chat_completion_exhausts_retries_on_503() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": {"message": "The server is overloaded", "type": "server_error"}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .chat_completion(&test_request())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("server_error"), "got: {err}");
    }

    #[tokio::test]
    async fn non_json_error_body_is_reported_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .chat_completion(&test_request())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("401"), "got: {err}");
        assert!(err.contains("unauthorized"), "got: {err}");
    }

    #[tokio::test]
    async fn client_sends_bearer_auth() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-api-key"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("c", "ok")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.chat_completion(&test_request()).await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }

    #[tokio::test]
    async fn create_embeddings_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_partial_json(serde_json::json!({"model": "text-embedding-3-small"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [
                    {"object": "embedding", "index": 0, "embedding": [0.1, 0.2]},
                    {"object": "embedding", "index": 1, "embedding": [0.3, 0.4]}
                ],
                "model": "text-embedding-3-small"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client
            .create_embeddings(&EmbeddingRequest {
                model: "text-embedding-3-small".into(),
                input: vec!["a".into(), "b".into()],
            })
            .await
            .unwrap();
        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[1].embedding, vec![0.3, 0.4]);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client =
            OpenAiClient::new("k", "http://localhost:1234/v1/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234/v1");
    }

    #[test]
    fn transient_statuses() {
        assert!(is_transient_error(reqwest::StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient_error(reqwest::StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_transient_error(reqwest::StatusCode::BAD_REQUEST));
        assert!(!is_transient_error(reqwest::StatusCode::UNAUTHORIZED));
    }
}
