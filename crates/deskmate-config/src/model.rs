// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Deskmate support service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

/// Top-level Deskmate configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeskmateConfig {
    /// Hosted chat model settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Embedding model settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Persisted vector index and knowledge-base source.
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    /// Similarity search tuning.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// HTTP/WebSocket server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hosted LLM configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// API key. Falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Chat model used for classification, sentiment, and generation.
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Sampling temperature for every call.
    #[serde(default)]
    pub temperature: f32,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on generated tokens for grounded replies.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_llm_model(),
            temperature: 0.0,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn default_llm_model() -> String {
    "gpt-4o".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_tokens() -> u32 {
    1024
}

/// Embedding model configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Embedding model identifier.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Number of documents embedded per API call while indexing.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_batch_size() -> usize {
    64
}

/// Vector store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VectorStoreConfig {
    /// Directory holding the persisted index database.
    #[serde(default = "default_vector_store_path")]
    pub path: String,

    /// Collection name inside the index database.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// JSON file with the knowledge-base documents.
    #[serde(default = "default_documents_path")]
    pub documents_path: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            path: default_vector_store_path(),
            collection: default_collection(),
            documents_path: default_documents_path(),
        }
    }
}

impl VectorStoreConfig {
    /// Full path of the SQLite file backing the index.
    pub fn database_file(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.path).join("index.db")
    }
}

fn default_vector_store_path() -> String {
    "./knowledge_base".to_string()
}

fn default_collection() -> String {
    "knowledge_base".to_string()
}

fn default_documents_path() -> String {
    "data/support_documents.json".to_string()
}

/// Retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Maximum number of snippets returned per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum cosine similarity for a snippet to be used.
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            score_threshold: default_score_threshold(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

fn default_score_threshold() -> f32 {
    0.2
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum query length in characters.
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,

    /// Requests per minute per client. Accepted but not enforced.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Session lifetime in hours. Accepted but not enforced.
    #[serde(default = "default_session_timeout_hours")]
    pub session_timeout_hours: u32,

    /// CORS origins. Accepts a TOML array or a comma-separated string; `*` allows any.
    #[serde(
        default = "default_allowed_origins",
        deserialize_with = "deserialize_origins"
    )]
    pub allowed_origins: Vec<String>,

    /// Directory containing `index.html` and `static/`.
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_query_length: default_max_query_length(),
            rate_limit_per_minute: default_rate_limit(),
            session_timeout_hours: default_session_timeout_hours(),
            allowed_origins: default_allowed_origins(),
            frontend_dir: default_frontend_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_query_length() -> usize {
    500
}

fn default_rate_limit() -> u32 {
    10
}

fn default_session_timeout_hours() -> u32 {
    24
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:8000".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn default_frontend_dir() -> String {
    "frontend".to_string()
}

fn deserialize_origins<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Origins {
        List(Vec<String>),
        Csv(String),
    }

    let origins = match Origins::deserialize(deserializer)? {
        Origins::List(list) => list,
        Origins::Csv(csv) => csv.split(',').map(str::to_string).collect(),
    };

    Ok(origins
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect())
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error). Case-insensitive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// File that receives a copy of the log output. Empty disables it.
    #[serde(default = "default_log_file")]
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl LoggingConfig {
    /// The level normalized for use in a tracing filter directive.
    pub fn filter_level(&self) -> String {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "warning" => "warn".to_string(),
            "critical" => "error".to_string(),
            other => other.to_string(),
        }
    }

    /// The log file path, or `None` when file logging is off.
    pub fn file_path(&self) -> Option<&Path> {
        let file = self.file.trim();
        (!file.is_empty()).then(|| Path::new(file))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "agent.log".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = DeskmateConfig::default();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.vector_store.collection, "knowledge_base");
        assert_eq!(config.retrieval.top_k, 3);
        assert!((config.retrieval.score_threshold - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.max_query_length, 500);
        assert_eq!(config.server.rate_limit_per_minute, 10);
        assert_eq!(config.server.session_timeout_hours, 24);
        assert_eq!(config.server.allowed_origins.len(), 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn origins_accept_comma_separated_string() {
        let config: DeskmateConfig = toml::from_str(
            r#"
[server]
allowed_origins = "http://a.example, http://b.example,"
"#,
        )
        .unwrap();
        assert_eq!(
            config.server.allowed_origins,
            vec!["http://a.example", "http://b.example"]
        );
    }

    #[test]
    fn origins_accept_array() {
        let config: DeskmateConfig = toml::from_str(
            r#"
[server]
allowed_origins = ["*"]
"#,
        )
        .unwrap();
        assert_eq!(config.server.allowed_origins, vec!["*"]);
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let llm = LlmConfig {
            api_key: Some("sk-secret".to_string()),
            ..LlmConfig::default()
        };
        let debug = format!("{llm:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn filter_level_normalizes_python_style_names() {
        let logging = LoggingConfig {
            level: "WARNING".to_string(),
            ..Default::default()
        };
        assert_eq!(logging.filter_level(), "warn");
        let logging = LoggingConfig {
            level: "INFO".to_string(),
            ..Default::default()
        };
        assert_eq!(logging.filter_level(), "info");
    }

    #[test]
    fn log_file_defaults_on_and_blank_disables_it() {
        let logging = LoggingConfig::default();
        assert_eq!(logging.file_path(), Some(Path::new("agent.log")));

        let logging = LoggingConfig {
            file: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(logging.file_path(), None);
    }

    #[test]
    fn database_file_lives_under_store_path() {
        let store = VectorStoreConfig {
            path: "/tmp/kb".to_string(),
            ..VectorStoreConfig::default()
        };
        assert_eq!(store.database_file(), std::path::PathBuf::from("/tmp/kb/index.db"));
    }
}
