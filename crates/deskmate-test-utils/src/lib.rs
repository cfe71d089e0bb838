// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Deskmate integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock LLM provider with scripted responses and failures
//! - [`MockEmbedder`] - Deterministic bag-of-words embedder
//! - [`TestHarness`] - Full support agent over a temp vector store

pub mod harness;
pub mod mock_embedder;
pub mod mock_provider;

pub use harness::{document, sample_documents, TestHarness};
pub use mock_embedder::MockEmbedder;
pub use mock_provider::MockProvider;
