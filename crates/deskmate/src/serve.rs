// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `deskmate serve` command implementation.
//!
//! Builds the OpenAI provider and embedder, loads the knowledge index
//! (degrading to an ungrounded service when it is unavailable), and runs the
//! HTTP/WebSocket gateway until a shutdown signal arrives.

use std::path::Path;
use std::sync::Arc;

use deskmate_agent::{shutdown, SupportAgent};
use deskmate_config::model::LoggingConfig;
use deskmate_config::DeskmateConfig;
use deskmate_core::DeskmateError;
use deskmate_gateway::{start_server, GatewayState};
use deskmate_openai::{OpenAiEmbedder, OpenAiProvider};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::index::connect_retriever;

/// Runs the `deskmate serve` command.
pub async fn run_serve(config: DeskmateConfig) -> Result<(), DeskmateError> {
    info!(
        model = %config.llm.model,
        embedding_model = %config.embedding.model,
        "starting deskmate serve"
    );

    let provider = OpenAiProvider::new(&config.llm).map_err(|e| {
        error!(error = %e, "failed to initialize OpenAI provider");
        e
    })?;
    let embedder = Arc::new(OpenAiEmbedder::new(&config.llm, &config.embedding)?);

    let retriever = Arc::new(connect_retriever(&config, embedder).await);
    let agent = Arc::new(SupportAgent::new(Arc::new(provider), retriever, &config));

    let state = GatewayState::new(
        agent.clone(),
        &config.llm.model,
        &config.server.frontend_dir,
    );
    let cancel = shutdown::install_signal_handler();

    let served = start_server(&config.server, state, cancel).await;
    agent.shutdown().await;
    served?;
    info!("deskmate shut down");
    Ok(())
}

/// Default filter for the given level; `RUST_LOG` takes precedence.
fn default_filter(level: &str) -> String {
    format!("deskmate={level},tower_http={level},warn")
}

fn file_appender(path: &Path) -> Result<RollingFileAppender, InitError> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "agent.log".to_string());
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
}

/// Installs the global subscriber.
///
/// Logs go to stderr so command output on stdout stays machine-readable, and
/// to `logging.file` when one is set. Hold the returned guard until exit or
/// buffered file lines are lost.
pub fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&logging.filter_level())));

    let mut file_error = None;
    let (file_layer, guard) = match logging.file_path().map(file_appender) {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        Some(Err(e)) => {
            file_error = Some(e);
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_names(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        warn!(file = %logging.file, error = %e, "log file unavailable, logging to stderr only");
    }
    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_appender_creates_missing_directories() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("deskmate.log");

        let mut appender = file_appender(&path).unwrap();
        appender.write_all(b"hello\n").unwrap();
        appender.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn filter_covers_service_and_http_layers() {
        assert_eq!(
            default_filter("debug"),
            "deskmate=debug,tower_http=debug,warn"
        );
    }
}
