// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Miette diagnostics for configuration failures.
//!
//! Figment reports unknown keys with the list of fields the section accepts;
//! those become [`ConfigError::UnknownKey`] with a closest-match suggestion
//! and, when the key came from a file we can read, a labelled source span.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::{Error as FigmentError, Kind};
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler similarity a valid key needs before it is offered as a fix.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(code(deskmate::config::unknown_key))]
    UnknownKey {
        key: String,
        /// Closest accepted key, if any is similar enough.
        suggestion: Option<String>,
        #[help]
        help: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(deskmate::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(deskmate::config::missing_key),
        help("set `{key}` in deskmate.toml or through its DESKMATE_ environment variable")
    )]
    MissingKey { key: String },

    /// A value that parsed but is out of range or otherwise unusable.
    #[error("validation error: {message}")]
    #[diagnostic(code(deskmate::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(deskmate::config::other))]
    Other(String),
}

/// Splits a figment error into one diagnostic per underlying failure.
///
/// `toml_sources` holds `(path, contents)` pairs used to attach source spans.
pub fn figment_to_config_errors(
    err: FigmentError,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(&error, toml_sources))
        .collect()
}

fn convert(error: &FigmentError, toml_sources: &[(String, String)]) -> ConfigError {
    let section: Vec<String> = error.path.iter().map(ToString::to_string).collect();

    match &error.kind {
        Kind::UnknownField(field, accepted) => {
            let suggestion = suggest_key(field, accepted);
            let help = match &suggestion {
                Some(s) => format!("did you mean `{s}`? accepted keys: {}", accepted.join(", ")),
                None => format!("accepted keys: {}", accepted.join(", ")),
            };
            let located = source_of(error, toml_sources).and_then(|(path, content)| {
                find_key_offset(content, &section, field).map(|offset| {
                    (
                        SourceSpan::new(offset.into(), field.len()),
                        NamedSource::new(path, content.to_string()),
                    )
                })
            });
            let (span, src) = located.unzip();
            ConfigError::UnknownKey {
                key: qualified(&section, field),
                suggestion,
                help,
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: qualified(&section, field),
        },
        Kind::InvalidType(found, expected) => ConfigError::InvalidType {
            key: section.join("."),
            found: found.to_string(),
            expected: expected.clone(),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

fn qualified(section: &[String], field: &str) -> String {
    if section.is_empty() {
        field.to_string()
    } else {
        format!("{}.{field}", section.join("."))
    }
}

/// The readable TOML file this error was raised from, if we have its contents.
fn source_of<'a>(
    error: &FigmentError,
    toml_sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let figment::Source::File(path) = error.metadata.as_ref()?.source.as_ref()? else {
        return None;
    };
    let path = path.display().to_string();
    toml_sources
        .iter()
        .find(|(p, _)| *p == path)
        .map(|(p, content)| (p.as_str(), content.as_str()))
}

/// Byte offset of `field` inside the `[section]` table named by `path`.
///
/// Only the first path element is used as the table name; with an empty path
/// the search covers the top-level keys before the first table header.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let mut in_table = path.is_empty();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            let header = trimmed.trim_end();
            in_table = path
                .first()
                .is_some_and(|table| header == format!("[{table}]"));
        } else if in_table
            && let Some(rest) = trimmed.strip_prefix(field)
            && rest.starts_with([' ', '\t', '='])
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }

    None
}

/// Closest key by Jaro-Winkler similarity, when one clears the threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for &key in valid_keys {
        let score = strsim::jaro_winkler(unknown, key);
        if score > SUGGESTION_THRESHOLD && best.is_none_or(|(_, top)| score > top) {
            best = Some((key, score));
        }
    }
    best.map(|(key, _)| key.to_string())
}

/// Prints each error to stderr as a graphical miette report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    let mut out = String::new();
    for error in errors {
        out.clear();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_nearest_key() {
        assert_eq!(
            suggest_key("top_kk", &["top_k", "score_threshold"]),
            Some("top_k".to_string())
        );
        assert_eq!(
            suggest_key("colection", &["path", "collection", "documents_path"]),
            Some("collection".to_string())
        );
    }

    #[test]
    fn distant_typo_gets_no_suggestion() {
        assert_eq!(suggest_key("zzzzzz", &["model", "temperature", "base_url"]), None);
    }

    #[test]
    fn key_offset_is_scoped_to_its_table() {
        let content = "[server]\ntop_kk = 1\n\n[retrieval]\ntop_kk = 4\n";
        let path = vec!["retrieval".to_string()];
        let offset = find_key_offset(content, &path, "top_kk").unwrap();
        assert_eq!(offset, content.rfind("top_kk").unwrap());
    }

    #[test]
    fn key_offset_handles_indent_and_crlf() {
        let content = "[llm]\r\n  modle = \"x\"\r\n";
        let path = vec!["llm".to_string()];
        let offset = find_key_offset(content, &path, "modle").unwrap();
        assert_eq!(&content[offset..offset + 5], "modle");
    }

    #[test]
    fn key_missing_from_table_has_no_offset() {
        let content = "[llm]\nmodel = \"x\"\n[server]\nmodle = 1\n";
        let path = vec!["llm".to_string()];
        assert_eq!(find_key_offset(content, &path, "modle"), None);
    }

    #[test]
    fn unknown_key_help_lists_accepted_keys() {
        let err = ConfigError::UnknownKey {
            key: "retrieval.top_kk".into(),
            suggestion: Some("top_k".into()),
            help: "did you mean `top_k`? accepted keys: top_k, score_threshold".into(),
            span: None,
            src: None,
        };
        let help = err.help().map(|h| h.to_string()).unwrap();
        assert!(help.contains("did you mean `top_k`"));
        assert_eq!(err.to_string(), "unknown configuration key `retrieval.top_kk`");
    }
}
