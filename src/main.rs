use anyhow::{Context, Result};
use clap::Parser;

use mcp_mysql::cli::{self, Cli};
use mcp_mysql::stdio::MysqlToolServer;
use mcp_mysql::{ConnectionProvider, DatabaseTools};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr; stdout carries the MCP transport)
    env_logger::init();

    // Load .env before reading MYSQL_* settings; real environment wins
    if let Ok(path) = dotenv::dotenv() {
        log::debug!("Loaded environment from {}", path.display());
    }

    let cli = Cli::parse();

    if cli.list_tools {
        println!("Available tools:");
        for tool in cli::available_tools() {
            println!("  - {tool}");
        }
        return Ok(());
    }

    let enabled_tools = cli.enabled_tools()?;

    // VALIDATE IMMEDIATELY - before connecting
    if let Some(ref tools) = enabled_tools {
        let available = cli::available_tools();
        let invalid: Vec<_> = tools
            .iter()
            .filter(|tool| !available.contains(&tool.as_str()))
            .collect();

        if !invalid.is_empty() {
            eprintln!("Error: Invalid tool names specified:");
            for tool in &invalid {
                eprintln!("  - {tool}");
            }
            eprintln!();
            eprintln!("Available tools:");
            for tool in available {
                eprintln!("  - {tool}");
            }
            return Err(anyhow::anyhow!("Invalid tool names specified"));
        }
    }

    let config = cli.database_config()?;
    let provider = ConnectionProvider::connect(&config)
        .await
        .context("Failed to connect to MySQL")?;

    let shutdown_token = tokio_util::sync::CancellationToken::new();

    // Spawn cross-platform signal handler
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        wait_for_interrupt().await;
        log::debug!("Received interrupt signal, shutting down");
        signal_token.cancel();
    });

    let server = MysqlToolServer::new(DatabaseTools::new(provider.clone()), enabled_tools);
    let served = server.serve_stdio(shutdown_token).await;

    provider.close().await;
    served
}

/// Wait for interrupt signal (cross-platform)
#[cfg(unix)]
async fn wait_for_interrupt() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm_result = signal(SignalKind::terminate());
    let mut sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result.as_mut(), sigint_result.as_mut()) {
        (Ok(sigterm), Ok(sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {}
                _ = sigint.recv() => {}
            }
        }
        (Ok(sigterm), Err(_)) => {
            let _ = sigterm.recv().await;
        }
        (Err(_), Ok(sigint)) => {
            let _ = sigint.recv().await;
        }
        (Err(_), Err(_)) => {
            // If both fail, just wait forever (shouldn't happen)
            let () = std::future::pending().await;
        }
    }
}

/// Wait for interrupt signal (cross-platform)
#[cfg(windows)]
async fn wait_for_interrupt() {
    use tokio::signal::windows;

    match windows::ctrl_c() {
        Ok(mut ctrl_c) => {
            let _ = ctrl_c.recv().await;
        }
        Err(_) => {
            let () = std::future::pending().await;
        }
    }
}
