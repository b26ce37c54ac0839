//! MSSQL MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to explore a Microsoft SQL Server database: run read-only queries, list
//! and describe tables, sample rows, and search table names.

use clap::Parser;
use mssql_mcp_server::auth::AuthConfig;
use mssql_mcp_server::config::{Config, TransportMode};
use mssql_mcp_server::db::ConnectionManager;
use mssql_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    init_tracing(&config);

    let settings = match config.connection_settings() {
        Ok(settings) => settings,
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!();
            eprintln!("Usage: mssql-mcp-server --server <host> --database <name> \\");
            eprintln!("           --user <login> --password <password>");
            eprintln!();
            eprintln!("All options can also be set through the environment:");
            eprintln!("  MSSQL_SERVER, MSSQL_PORT, MSSQL_DATABASE, MSSQL_USER, MSSQL_PASSWORD,");
            eprintln!("  MSSQL_ENCRYPT, MSSQL_TRUST_SERVER_CERT");
            std::process::exit(1);
        }
    };

    info!(
        transport = %config.transport,
        server = %settings.server,
        database = %settings.database,
        "Starting MSSQL MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    // The pool is established lazily by the first tool call
    let connection_manager = Arc::new(ConnectionManager::new(settings));

    let result = match config.transport {
        TransportMode::Stdio => {
            info!("Using stdio transport");
            let transport = StdioTransport::new(connection_manager);
            transport.run().await
        }
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            let auth_config = AuthConfig::from_tokens(config.auth_tokens.clone())?;
            let transport = HttpTransport::new(
                connection_manager,
                auth_config,
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            );
            transport.run().await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
