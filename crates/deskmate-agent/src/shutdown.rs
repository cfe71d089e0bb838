// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! Installs handlers for SIGTERM and SIGINT (Ctrl+C), triggering a
//! [`CancellationToken`] that the HTTP server watches. In-flight requests
//! finish before the process exits.

use std::fmt::Display;
use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Spawns a task that cancels the returned token on SIGINT or SIGTERM.
///
/// The task also exits if the token is cancelled by someone else first.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let watcher = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            signal = wait_for_signal() => {
                info!(signal, "shutdown requested");
                watcher.cancel();
            }
            _ = watcher.cancelled() => {
                debug!("shutdown already in progress, signal watcher exiting");
            }
        }
    });

    token
}

/// Awaits a signal listener. A listener that failed to register never
/// resolves, so it cannot be mistaken for a delivered signal.
async fn or_pending<E: Display>(listener: impl Future<Output = Result<(), E>>, signal: &str) {
    if let Err(e) = listener.await {
        warn!(signal, error = %e, "signal handler unavailable");
        std::future::pending::<()>().await;
    }
}

/// Resolves with the name of the first shutdown signal received.
#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let ctrl_c = or_pending(tokio::signal::ctrl_c(), "SIGINT");
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "SIGTERM handler unavailable, watching Ctrl+C only");
            ctrl_c.await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        Some(()) = sigterm.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    or_pending(tokio::signal::ctrl_c(), "Ctrl+C").await;
    "Ctrl+C"
}
