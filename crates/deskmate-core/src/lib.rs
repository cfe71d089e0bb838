// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Deskmate support service.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types (categories, sentiments, routes) used throughout the
//! Deskmate workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::DeskmateError;
pub use types::{AdapterType, Category, HealthStatus, Route, Sentiment, SessionId};

pub use traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter};
