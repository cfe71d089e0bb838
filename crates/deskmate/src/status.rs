// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `deskmate status` command implementation.
//!
//! Queries a running server's `/health` and `/api/status` endpoints and
//! reports knowledge-index connectivity, model, and uptime. Falls back
//! gracefully when the server is not running.

use std::io::IsTerminal;
use std::time::Duration;

use deskmate_config::DeskmateConfig;
use deskmate_core::DeskmateError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
    vectordb: String,
    documents: usize,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    version: String,
    model: String,
    uptime_secs: u64,
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub running: bool,
    pub health: String,
    pub vectordb: Option<String>,
    pub documents: Option<usize>,
    pub version: Option<String>,
    pub model: Option<String>,
    pub uptime_secs: Option<u64>,
    pub uptime_human: Option<String>,
    pub endpoint: String,
}

impl StatusReport {
    fn offline(endpoint: String) -> Self {
        Self {
            running: false,
            health: "not running".to_string(),
            vectordb: None,
            documents: None,
            version: None,
            model: None,
            uptime_secs: None,
            uptime_human: None,
            endpoint,
        }
    }

    fn online(endpoint: String, health: HealthBody, status: Option<StatusBody>) -> Self {
        Self {
            running: true,
            health: health.status,
            vectordb: Some(health.vectordb),
            documents: Some(health.documents),
            version: status.as_ref().map(|s| s.version.clone()),
            model: status.as_ref().map(|s| s.model.clone()),
            uptime_secs: status.as_ref().map(|s| s.uptime_secs),
            uptime_human: status.as_ref().map(|s| format_uptime(s.uptime_secs)),
            endpoint,
        }
    }
}

/// Format seconds into a human-readable duration string.
fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Wildcard bind addresses are not connectable; probe loopback instead.
fn probe_host(host: &str) -> &str {
    match host {
        "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
        other => other,
    }
}

async fn fetch_report(base: &str) -> Result<StatusReport, DeskmateError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| DeskmateError::Internal(format!("failed to create HTTP client: {e}")))?;

    let health = match client.get(format!("{base}/health")).send().await {
        Ok(resp) if resp.status().is_success() => resp.json::<HealthBody>().await.map_err(|e| {
            DeskmateError::Internal(format!("failed to parse health response: {e}"))
        })?,
        _ => return Ok(StatusReport::offline(base.to_string())),
    };

    let status = match client.get(format!("{base}/api/status")).send().await {
        Ok(resp) if resp.status().is_success() => resp.json::<StatusBody>().await.ok(),
        _ => None,
    };

    Ok(StatusReport::online(base.to_string(), health, status))
}

/// Run the `deskmate status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(config: &DeskmateConfig, json: bool, plain: bool) -> Result<(), DeskmateError> {
    let base = format!(
        "http://{}:{}",
        probe_host(&config.server.host),
        config.server.port
    );
    let report = fetch_report(&base).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
        );
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    if report.running {
        print_status_running(&report, use_color);
    } else {
        print_status_offline(&report.endpoint, use_color);
    }
    Ok(())
}

fn print_status_running(report: &StatusReport, use_color: bool) {
    let healthy = report.health == "healthy";
    let uptime = report.uptime_human.as_deref().unwrap_or("unknown");

    println!();
    println!("  deskmate status");
    println!("  {}", "-".repeat(35));

    if use_color {
        use colored::Colorize;
        let mark = if healthy { "✓".green() } else { "!".yellow() };
        let state = if healthy {
            report.health.green()
        } else {
            report.health.yellow()
        };
        println!("    State:    {mark} {state} (uptime: {uptime})");
    } else {
        let mark = if healthy { "[OK]" } else { "[WARN]" };
        println!("    State:    {mark} {} (uptime: {uptime})", report.health);
    }

    if let Some(vectordb) = &report.vectordb {
        println!(
            "    Index:    {vectordb} ({} documents)",
            report.documents.unwrap_or(0)
        );
    }
    if let Some(model) = &report.model {
        println!("    Model:    {model}");
    }
    if let Some(version) = &report.version {
        println!("    Version:  {version}");
    }
    println!();
}

fn print_status_offline(endpoint: &str, use_color: bool) {
    println!();
    println!("  deskmate status");
    println!("  {}", "-".repeat(35));

    if use_color {
        use colored::Colorize;
        println!("    State:    {} {}", "✗".red(), "not running".red());
    } else {
        println!("    State:    [FAIL] not running");
    }

    println!("    Endpoint: {endpoint}/health");
    println!();
    println!("  Start with: deskmate serve");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn format_uptime_variants() {
        assert_eq!(format_uptime(120), "2m");
        assert_eq!(format_uptime(3720), "1h 2m");
        assert_eq!(format_uptime(90060), "1d 1h 1m");
    }

    #[test]
    fn wildcard_hosts_probe_loopback() {
        assert_eq!(probe_host("0.0.0.0"), "127.0.0.1");
        assert_eq!(probe_host("10.0.0.5"), "10.0.0.5");
    }

    #[tokio::test]
    async fn running_server_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "healthy",
                "vectordb": "connected",
                "documents": 12,
                "timestamp": "2026-01-01T00:00:00Z"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "online",
                "version": "0.1.0",
                "model": "gpt-4o",
                "max_query_length": 500,
                "uptime_secs": 3720,
                "timestamp": "2026-01-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let report = fetch_report(&server.uri()).await.unwrap();
        assert!(report.running);
        assert_eq!(report.health, "healthy");
        assert_eq!(report.documents, Some(12));
        assert_eq!(report.model.as_deref(), Some("gpt-4o"));
        assert_eq!(report.uptime_human.as_deref(), Some("1h 2m"));
    }

    #[tokio::test]
    async fn unreachable_server_is_offline() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let report = fetch_report(&format!("http://{addr}")).await.unwrap();
        assert!(!report.running);
        assert_eq!(report.health, "not running");
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"running\":false"));
    }
}
