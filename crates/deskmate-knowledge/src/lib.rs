// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge base for the Deskmate support service.
//!
//! Loads the static document collection, embeds it once into a SQLite-persisted
//! collection, and serves cosine-similarity retrieval with an optional
//! category filter.

pub mod index;
pub mod retriever;
pub mod store;
pub mod types;

pub use index::{IndexBuildReport, VectorIndex};
pub use retriever::{IndexStatus, Retriever};
pub use store::VectorStore;
pub use types::{KnowledgeBase, KnowledgeDocument, RetrievedSnippet};
