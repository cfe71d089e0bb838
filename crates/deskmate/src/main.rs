// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deskmate - customer-support chat service.
//!
//! This is the binary entry point for the Deskmate service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod ask;
mod index;
mod serve;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use deskmate_config::DeskmateConfig;

/// Deskmate - customer-support chat service.
#[derive(Parser, Debug)]
#[command(name = "deskmate", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG lookup.
    #[arg(long, short, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP/WebSocket server (default).
    Serve,
    /// Embed the knowledge base and refresh the persisted index.
    Index {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Run a single query through the support pipeline.
    Ask {
        /// The customer query.
        query: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the state of a running server.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> DeskmateConfig {
    let result = match path {
        Some(path) => deskmate_config::load_and_validate_path(path),
        None => deskmate_config::load_and_validate(),
    };
    match result {
        Ok(config) => config,
        Err(errors) => {
            deskmate_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let command = cli.command.unwrap_or(Commands::Serve);
    let log_guard = if matches!(command, Commands::Status { .. }) {
        None
    } else {
        serve::init_tracing(&config.logging)
    };

    let result = match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Index { json } => index::run_index(&config, json).await,
        Commands::Ask { query, json } => ask::run_ask(&config, &query, json).await,
        Commands::Status { json, plain } => status::run_status(&config, json, plain).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        // flush buffered file logs; exit skips destructors
        drop(log_guard);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["deskmate"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn ask_takes_query_and_global_config() {
        let cli = Cli::try_parse_from([
            "deskmate",
            "ask",
            "What payment methods do you support?",
            "--json",
            "--config",
            "/tmp/deskmate.toml",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Ask { query, json }) => {
                assert_eq!(query, "What payment methods do you support?");
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/deskmate.toml")));
    }

    #[test]
    fn status_flags_parse() {
        let cli = Cli::try_parse_from(["deskmate", "status", "--json", "--plain"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Status { json: true, plain: true })
        ));
    }
}
