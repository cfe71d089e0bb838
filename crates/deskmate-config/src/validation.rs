// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Covers semantic constraints serde attributes cannot express: numeric
//! ranges for retrieval tuning, non-empty model names and paths, and a
//! bindable host address.

use crate::diagnostic::ConfigError;
use crate::model::DeskmateConfig;

/// Log levels accepted by `logging.level` (case-insensitive).
const LOG_LEVELS: &[&str] = &[
    "trace", "debug", "info", "warn", "warning", "error", "critical",
];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &DeskmateConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    // Server
    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.server.max_query_length == 0 {
        fail("server.max_query_length must be greater than 0".to_string());
    }

    if config.server.frontend_dir.trim().is_empty() {
        fail("server.frontend_dir must not be empty".to_string());
    }

    // Retrieval
    if config.retrieval.top_k == 0 {
        fail("retrieval.top_k must be at least 1".to_string());
    }

    let threshold = config.retrieval.score_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        fail(format!(
            "retrieval.score_threshold must be between 0.0 and 1.0, got {threshold}"
        ));
    }

    // LLM
    if config.llm.model.trim().is_empty() {
        fail("llm.model must not be empty".to_string());
    }

    let temperature = config.llm.temperature;
    if !(0.0..=2.0).contains(&temperature) {
        fail(format!(
            "llm.temperature must be between 0.0 and 2.0, got {temperature}"
        ));
    }

    if !config.llm.base_url.starts_with("http://") && !config.llm.base_url.starts_with("https://")
    {
        fail(format!(
            "llm.base_url must start with http:// or https://, got `{}`",
            config.llm.base_url
        ));
    }

    if config.llm.timeout_secs == 0 {
        fail("llm.timeout_secs must be greater than 0".to_string());
    }

    // Embedding
    if config.embedding.model.trim().is_empty() {
        fail("embedding.model must not be empty".to_string());
    }

    if config.embedding.batch_size == 0 {
        fail("embedding.batch_size must be at least 1".to_string());
    }

    // Vector store
    if config.vector_store.path.trim().is_empty() {
        fail("vector_store.path must not be empty".to_string());
    }

    if config.vector_store.documents_path.trim().is_empty() {
        fail("vector_store.documents_path must not be empty".to_string());
    }

    let collection = &config.vector_store.collection;
    if collection.is_empty()
        || !collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        fail(format!(
            "vector_store.collection `{collection}` must be non-empty and contain only letters, digits, `_` or `-`"
        ));
    }

    // Logging
    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "logging.level `{}` is not one of trace, debug, info, warn, error",
            config.logging.level
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
