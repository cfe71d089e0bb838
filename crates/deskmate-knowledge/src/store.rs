// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed persistence for embedded knowledge-base collections.
//!
//! Each collection is stored with the fingerprint of the documents and model
//! that produced it, so a restart with unchanged inputs skips re-embedding.

use std::path::Path;

use deskmate_core::DeskmateError;
use tokio_rusqlite::Connection;

use crate::types::{blob_to_vec, vec_to_blob, DocumentMetadata, KnowledgeDocument};

fn storage_err(e: tokio_rusqlite::Error) -> DeskmateError {
    DeskmateError::Storage {
        source: Box::new(e),
    }
}

/// `Connection::open*` report plain rusqlite errors.
fn open_err(e: rusqlite::Error) -> DeskmateError {
    DeskmateError::Storage {
        source: Box::new(e),
    }
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS collections (
        name TEXT PRIMARY KEY NOT NULL,
        fingerprint TEXT NOT NULL,
        embedding_model TEXT NOT NULL,
        dimensions INTEGER NOT NULL,
        document_count INTEGER NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    );

    CREATE TABLE IF NOT EXISTS embeddings (
        collection TEXT NOT NULL,
        doc_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        content TEXT NOT NULL,
        category TEXT,
        source TEXT,
        metadata TEXT,
        embedding BLOB NOT NULL,
        PRIMARY KEY (collection, doc_id)
    );

    CREATE INDEX IF NOT EXISTS idx_embeddings_position ON embeddings(collection, position);
";

/// Summary row for a stored collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionInfo {
    pub name: String,
    pub fingerprint: String,
    pub embedding_model: String,
    pub dimensions: usize,
    pub document_count: usize,
    pub updated_at: String,
}

/// A document with its stored embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEmbedding {
    pub document: KnowledgeDocument,
    pub embedding: Vec<f32>,
}

/// Persistent store for embedded collections in SQLite.
///
/// All access goes through tokio-rusqlite's background thread.
pub struct VectorStore {
    conn: Connection,
}

impl VectorStore {
    /// Opens (or creates) the database file, creating parent directories as needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DeskmateError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DeskmateError::Storage {
                    source: Box::new(e),
                })?;
        }

        let conn = Connection::open(path).await.map_err(open_err)?;
        let store = Self { conn };
        store.migrate().await?;
        Ok(store)
    }

    /// Opens a throwaway in-memory database.
    pub async fn open_in_memory() -> Result<Self, DeskmateError> {
        let conn = Connection::open_in_memory().await.map_err(open_err)?;
        let store = Self { conn };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), DeskmateError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch(SCHEMA)?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Returns the collection summary, or `None` if it was never written.
    pub async fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>, DeskmateError> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CollectionInfo>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name, fingerprint, embedding_model, dimensions, document_count, updated_at
                     FROM collections WHERE name = ?1",
                )?;
                let mut rows = stmt.query(rusqlite::params![name])?;
                match rows.next()? {
                    Some(row) => {
                        let dimensions: i64 = row.get(3)?;
                        let document_count: i64 = row.get(4)?;
                        Ok(Some(CollectionInfo {
                            name: row.get(0)?,
                            fingerprint: row.get(1)?,
                            embedding_model: row.get(2)?,
                            dimensions: dimensions.max(0) as usize,
                            document_count: document_count.max(0) as usize,
                            updated_at: row.get(5)?,
                        }))
                    }
                    None => Ok(None),
                }
            })
            .await
            .map_err(storage_err)
    }

    /// Returns the stored fingerprint for a collection.
    pub async fn collection_fingerprint(&self, name: &str) -> Result<Option<String>, DeskmateError> {
        Ok(self.collection_info(name).await?.map(|info| info.fingerprint))
    }

    /// Loads every stored document and embedding for a collection, in insertion order.
    pub async fn load_collection(&self, name: &str) -> Result<Vec<StoredEmbedding>, DeskmateError> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<StoredEmbedding>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT doc_id, content, category, source, metadata, embedding
                     FROM embeddings WHERE collection = ?1 ORDER BY position ASC",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![name], |row| {
                        let metadata_json: Option<String> = row.get(4)?;
                        let blob: Vec<u8> = row.get(5)?;
                        let extra = metadata_json
                            .and_then(|json| serde_json::from_str(&json).ok())
                            .unwrap_or_default();
                        Ok(StoredEmbedding {
                            document: KnowledgeDocument {
                                id: row.get(0)?,
                                text: row.get(1)?,
                                metadata: DocumentMetadata {
                                    category: row.get(2)?,
                                    source: row.get(3)?,
                                    extra,
                                },
                            },
                            embedding: blob_to_vec(&blob),
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(storage_err)
    }

    /// Atomically replaces a collection's contents and fingerprint.
    pub async fn replace_collection(
        &self,
        name: &str,
        fingerprint: &str,
        embedding_model: &str,
        entries: Vec<StoredEmbedding>,
    ) -> Result<(), DeskmateError> {
        let name = name.to_string();
        let fingerprint = fingerprint.to_string();
        let embedding_model = embedding_model.to_string();
        let dimensions = entries.first().map(|e| e.embedding.len()).unwrap_or(0) as i64;
        let document_count = entries.len() as i64;

        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "DELETE FROM embeddings WHERE collection = ?1",
                    rusqlite::params![name],
                )?;
                {
                    let mut insert = tx.prepare(
                        "INSERT INTO embeddings (collection, doc_id, position, content, category, source, metadata, embedding)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    )?;
                    for (position, entry) in entries.iter().enumerate() {
                        let metadata = if entry.document.metadata.extra.is_empty() {
                            None
                        } else {
                            serde_json::to_string(&entry.document.metadata.extra).ok()
                        };
                        insert.execute(rusqlite::params![
                            name,
                            entry.document.id,
                            position as i64,
                            entry.document.text,
                            entry.document.metadata.category,
                            entry.document.metadata.source,
                            metadata,
                            vec_to_blob(&entry.embedding),
                        ])?;
                    }
                }
                tx.execute(
                    "INSERT INTO collections (name, fingerprint, embedding_model, dimensions, document_count)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(name) DO UPDATE SET
                        fingerprint = excluded.fingerprint,
                        embedding_model = excluded.embedding_model,
                        dimensions = excluded.dimensions,
                        document_count = excluded.document_count,
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                    rusqlite::params![name, fingerprint, embedding_model, dimensions, document_count],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Closes the background connection.
    pub async fn close(self) -> Result<(), DeskmateError> {
        self.conn.close().await.map_err(storage_err)
    }
}
