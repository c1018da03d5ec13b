//! gmaps-mcp - Model Context Protocol server for Google Maps services.
//!
//! Serves the maps tool surface over stdio or HTTP. In HTTP mode each
//! configured instance gets its own session registry; a misconfigured
//! instance is skipped without stopping the others.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gmaps_mcp::config::{self, ConfigError};
use gmaps_mcp::maps;
use gmaps_mcp::protocol::McpEngine;
use gmaps_mcp::tools::ToolRegistry;
use gmaps_mcp::transport::http::{self, AppState};
use gmaps_mcp::transport::stdio;

/// Model Context Protocol server for Google Maps services.
#[derive(Parser)]
#[command(name = "gmaps-mcp", version, about)]
struct Cli {
    /// Port to run the MCP server on (overrides MCP_SERVER_PORT)
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Google Maps API key (overrides GOOGLE_MAPS_API_KEY)
    #[arg(short = 'k', long = "apikey", hide_env_values = true, env = "GOOGLE_MAPS_API_KEY")]
    apikey: Option<String>,

    /// Serve a single session over stdin/stdout instead of HTTP
    #[arg(long)]
    stdio: bool,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays clean for the stdio transport.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!(error = %e, "failed to start");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let api_key = config::api_key(cli.apikey)?;
    let client = Arc::new(maps::Client::new(api_key));
    let engine = McpEngine::new(Arc::new(ToolRegistry::with_maps(client)));

    if cli.stdio {
        stdio::run(engine).await?;
        return Ok(());
    }

    let mut handles = Vec::new();
    if let Some(port) = cli.port {
        handles.push(spawn_instance("MCP-Server", port, engine.clone()));
    } else {
        for (name, port) in config::resolve_instances(config::instances()) {
            handles.push(spawn_instance(name, port, engine.clone()));
        }
    }

    if handles.is_empty() {
        return Err(Box::new(ConfigError::NoInstances));
    }

    info!(instances = handles.len(), "server initialization completed");
    for handle in handles {
        let _ = handle.await;
    }
    Ok(())
}

fn spawn_instance(name: &'static str, port: u16, engine: McpEngine) -> tokio::task::JoinHandle<()> {
    let state = AppState::new(engine);
    info!(instance = name, port, "starting HTTP instance");
    tokio::spawn(async move {
        if let Err(e) = http::serve(port, state).await {
            error!(instance = name, port, error = %e, "instance failed");
        }
    })
}
