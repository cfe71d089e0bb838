// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge-base document types and vector helpers.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use deskmate_core::DeskmateError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

/// Source label used when a document does not name one.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Metadata attached to a knowledge-base document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Lowercase category tag (technical, billing, general).
    #[serde(default)]
    pub category: Option<String>,
    /// Human-readable origin of the text (file, page, policy name).
    #[serde(default)]
    pub source: Option<String>,
    /// Any further metadata keys, preserved as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A static knowledge-base record. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    /// Stable identifier; assigned as `doc-<index>` when the file omits it.
    #[serde(default)]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl KnowledgeDocument {
    /// The document's source, or `Unknown`.
    pub fn source(&self) -> &str {
        self.metadata.source.as_deref().unwrap_or(UNKNOWN_SOURCE)
    }

    /// True when the document's category tag equals `tag`, ignoring case.
    pub fn has_category(&self, tag: &str) -> bool {
        self.metadata
            .category
            .as_deref()
            .is_some_and(|c| c.trim().eq_ignore_ascii_case(tag))
    }
}

/// A document paired with its similarity to a query.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedSnippet {
    pub document: KnowledgeDocument,
    /// Cosine similarity in `[-1, 1]`; higher is more similar.
    pub score: f32,
}

#[derive(Deserialize)]
struct KnowledgeFile {
    #[serde(default)]
    documents: Vec<KnowledgeDocument>,
}

/// The fixed document collection loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    documents: Vec<KnowledgeDocument>,
}

impl KnowledgeBase {
    /// Loads a JSON file shaped `{"documents": [{"text", "metadata"}]}`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DeskmateError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DeskmateError::Knowledge {
                message: format!("failed to read knowledge base {}: {e}", path.display()),
                source: Some(Box::new(e)),
            })?;

        let kb = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            documents = kb.len(),
            "knowledge base loaded"
        );
        Ok(kb)
    }

    /// Parses the JSON collection from a string.
    ///
    /// Documents with blank text are dropped; missing ids become `doc-<index>`.
    pub fn from_json_str(content: &str) -> Result<Self, DeskmateError> {
        let file: KnowledgeFile =
            serde_json::from_str(content).map_err(|e| DeskmateError::Knowledge {
                message: format!("malformed knowledge base JSON: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self::from_documents(file.documents))
    }

    /// Ids are unique within the base: a repeated id gets `-<index>` appended
    /// until it no longer collides.
    pub fn from_documents(documents: Vec<KnowledgeDocument>) -> Self {
        let mut seen = HashSet::new();
        let documents = documents
            .into_iter()
            .enumerate()
            .filter(|(_, doc)| !doc.text.trim().is_empty())
            .map(|(i, mut doc)| {
                if doc.id.trim().is_empty() {
                    doc.id = format!("doc-{i}");
                }
                while !seen.insert(doc.id.clone()) {
                    doc.id = format!("{}-{i}", doc.id);
                }
                doc
            })
            .collect();
        Self { documents }
    }

    pub fn documents(&self) -> &[KnowledgeDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// SHA-256 over the embedding model and every document's id, text, and metadata.
    ///
    /// A persisted collection is reused only when this value is unchanged.
    pub fn fingerprint(&self, embedding_model: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(embedding_model.as_bytes());
        for doc in &self.documents {
            hasher.update([0u8]);
            hasher.update(doc.id.as_bytes());
            hasher.update([0u8]);
            hasher.update(doc.text.as_bytes());
            hasher.update([0u8]);
            hasher.update(doc.metadata.category.as_deref().unwrap_or("").as_bytes());
            hasher.update([0u8]);
            hasher.update(doc.metadata.source.as_deref().unwrap_or("").as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Serialize an f32 vector as little-endian bytes for BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert a BLOB back to an f32 vector. Trailing partial chunks are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "documents": [
            {"text": "We support credit cards and PayPal.", "metadata": {"category": "billing", "source": "billing_faq.md"}},
            {"text": "Deploy on-premises with Docker.", "metadata": {"category": "technical"}},
            {"text": "   ", "metadata": {"category": "general"}},
            {"id": "hours", "text": "Support is available 24/7.", "metadata": {"category": "general", "source": "about", "priority": 2}}
        ]
    }"#;

    #[test]
    fn parses_documents_and_assigns_ids() {
        let kb = KnowledgeBase::from_json_str(SAMPLE).unwrap();
        assert_eq!(kb.len(), 3);
        assert_eq!(kb.documents()[0].id, "doc-0");
        assert_eq!(kb.documents()[1].id, "doc-1");
        assert_eq!(kb.documents()[2].id, "hours");
        assert_eq!(
            kb.documents()[2].metadata.extra.get("priority"),
            Some(&serde_json::json!(2))
        );
    }

    #[test]
    fn colliding_ids_are_made_unique() {
        let kb = KnowledgeBase::from_json_str(
            r#"{"documents": [
                {"id": "doc-1", "text": "explicit"},
                {"text": "generated"},
                {"id": "faq", "text": "first faq"},
                {"id": "faq", "text": "second faq"}
            ]}"#,
        )
        .unwrap();
        let ids: Vec<&str> = kb.documents().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["doc-1", "doc-1-1", "faq", "faq-3"]);
    }

    #[test]
    fn source_defaults_to_unknown() {
        let kb = KnowledgeBase::from_json_str(SAMPLE).unwrap();
        assert_eq!(kb.documents()[0].source(), "billing_faq.md");
        assert_eq!(kb.documents()[1].source(), "Unknown");
    }

    #[test]
    fn category_match_ignores_case() {
        let kb = KnowledgeBase::from_json_str(SAMPLE).unwrap();
        assert!(kb.documents()[0].has_category("Billing"));
        assert!(!kb.documents()[0].has_category("technical"));
    }

    #[test]
    fn malformed_json_is_a_knowledge_error() {
        let err = KnowledgeBase::from_json_str("{\"documents\": [").unwrap_err();
        assert!(matches!(err, DeskmateError::Knowledge { .. }));
    }

    #[test]
    fn missing_documents_key_yields_empty_base() {
        let kb = KnowledgeBase::from_json_str("{}").unwrap();
        assert!(kb.is_empty());
    }

    #[test]
    fn fingerprint_tracks_model_and_content() {
        let kb = KnowledgeBase::from_json_str(SAMPLE).unwrap();
        let a = kb.fingerprint("text-embedding-3-small");
        assert_eq!(a, kb.fingerprint("text-embedding-3-small"));
        assert_ne!(a, kb.fingerprint("text-embedding-3-large"));

        let mut docs = kb.documents().to_vec();
        docs[0].text.push('!');
        let changed = KnowledgeBase::from_documents(docs);
        assert_ne!(a, changed.fingerprint("text-embedding-3-small"));
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let err = KnowledgeBase::load("/definitely/not/here.json")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read knowledge base"));
    }

    #[test]
    fn vec_to_blob_roundtrip() {
        let original = vec![0.1_f32, -0.5, 1.0];
        let blob = vec_to_blob(&original);
        assert_eq!(blob.len(), 12);
        assert_eq!(blob_to_vec(&blob), original);
    }

    #[test]
    fn cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[2.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
