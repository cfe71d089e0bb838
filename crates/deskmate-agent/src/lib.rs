// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Support pipeline for the Deskmate service.
//!
//! Ties the classifier, sentiment scorer, router, retriever, and responder
//! into a single [`SupportAgent::handle`] call, and provides signal-driven
//! shutdown for the server binary.

pub mod pipeline;
pub mod responder;
pub mod shutdown;

pub use pipeline::{validate_query, AdapterHealth, SupportAgent, SupportOutcome};
pub use responder::{Reply, Responder, ESCALATION_MESSAGE};
