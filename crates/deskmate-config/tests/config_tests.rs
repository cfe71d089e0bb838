// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Deskmate configuration system.

use std::io::Write;

use deskmate_config::diagnostic::ConfigError;
use deskmate_config::{load_and_validate_path, load_and_validate_str, load_config, load_config_from_str};

/// Valid TOML with all sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_deskmate_config() {
    let toml = r#"
[llm]
api_key = "sk-test"
model = "gpt-4o-mini"
temperature = 0.2
base_url = "http://localhost:9999/v1"

[embedding]
model = "text-embedding-3-large"
batch_size = 16

[vector_store]
path = "/var/lib/deskmate"
collection = "support_docs"
documents_path = "/srv/docs.json"

[retrieval]
top_k = 5
score_threshold = 0.35

[server]
host = "127.0.0.1"
port = 9000
max_query_length = 280
allowed_origins = ["https://support.example.com"]

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(config.llm.base_url, "http://localhost:9999/v1");
    assert_eq!(config.embedding.model, "text-embedding-3-large");
    assert_eq!(config.embedding.batch_size, 16);
    assert_eq!(config.vector_store.path, "/var/lib/deskmate");
    assert_eq!(config.vector_store.collection, "support_docs");
    assert_eq!(config.vector_store.documents_path, "/srv/docs.json");
    assert_eq!(config.retrieval.top_k, 5);
    assert!((config.retrieval.score_threshold - 0.35).abs() < f32::EPSILON);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.max_query_length, 280);
    assert_eq!(
        config.server.allowed_origins,
        vec!["https://support.example.com"]
    );
    assert_eq!(config.logging.level, "debug");
}

/// Empty TOML falls back to the compiled defaults.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert!(config.llm.api_key.is_none());
    assert_eq!(config.llm.model, "gpt-4o");
    assert_eq!(config.embedding.model, "text-embedding-3-small");
    assert_eq!(config.vector_store.path, "./knowledge_base");
    assert_eq!(config.retrieval.top_k, 3);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.server.max_query_length, 500);
}

/// Unknown field in [retrieval] produces an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_field_produces_suggestion() {
    let toml = r#"
[retrieval]
top_kk = 4
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert!(key.ends_with("top_kk"), "got {key}");
            assert_eq!(suggestion.as_deref(), Some("top_k"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[telemetry]
enabled = true
"#;
    let err = load_config_from_str(toml).expect_err("should reject unknown section");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("telemetry"),
        "got: {err_str}"
    );
}

/// Wrong value type produces an InvalidType diagnostic naming the key.
#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[server]
port = "eighty"
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject bad type");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { .. })));
}

/// Parsing succeeds but validation rejects out-of-range values.
#[test]
fn validation_runs_after_parsing() {
    let toml = r#"
[retrieval]
top_k = 0
score_threshold = 2.0
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| matches!(e, ConfigError::Validation { .. })));
}

/// DESKMATE_* environment variables override local TOML values.
#[test]
fn env_vars_override_local_file() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "deskmate.toml",
            r#"
[llm]
model = "from-toml"

[retrieval]
top_k = 7
"#,
        )?;
        jail.set_env("DESKMATE_LLM_MODEL", "from-env");
        jail.set_env("DESKMATE_RETRIEVAL_SCORE_THRESHOLD", "0.5");
        jail.set_env("DESKMATE_VECTOR_STORE_COLLECTION", "env_collection");
        jail.set_env("DESKMATE_SERVER_ALLOWED_ORIGINS", "http://a.test,http://b.test");

        let config = load_config()?;
        assert_eq!(config.llm.model, "from-env");
        assert_eq!(config.retrieval.top_k, 7);
        assert!((config.retrieval.score_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.vector_store.collection, "env_collection");
        assert_eq!(
            config.server.allowed_origins,
            vec!["http://a.test", "http://b.test"]
        );
        Ok(())
    });
}

/// An explicit config path is honored and validated.
#[test]
fn explicit_path_is_loaded_and_validated() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[server]\nport = 8123\n").expect("write");

    let config = load_and_validate_path(file.path()).expect("valid file");
    assert_eq!(config.server.port, 8123);

    let mut bad = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(bad, "[server]\nmax_query_length = 0\n").expect("write");
    let errors = load_and_validate_path(bad.path()).expect_err("invalid file");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("max_query_length"))));
}
