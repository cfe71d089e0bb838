// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query classification, sentiment scoring, and routing for the Deskmate pipeline.
//!
//! This crate provides:
//! - [`Classifier`]: one model call mapping a query to Technical / Billing / General
//! - [`SentimentScorer`]: one model call mapping a query to Positive / Neutral / Negative
//! - [`route`]: the pure decision table that sends negative queries to a human

pub mod classifier;
pub mod router;
pub mod sentiment;

pub use classifier::{ClassificationResult, Classifier};
pub use router::{route, route_labels};
pub use sentiment::{SentimentResult, SentimentScorer};

/// Token cap for single-word label answers.
pub(crate) const LABEL_MAX_TOKENS: u32 = 10;
