//! volbridge: Volatility 3 memory forensics over REST and MCP.
//!
//! `volbridge serve` exposes registered Volatility plugins as a REST API.
//! `volbridge mcp` runs an MCP server on stdio whose tools query that API.

mod cli;
mod config;
mod plugins;
mod server;

use clap::Parser;
use cli::{Cli, Command};
use config::AnalyzerConfig;
use plugins::analyzer::VolatilityAnalyzer;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use server::tools::VolatilityMcpServer;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (logs to stderr so stdout stays clean for MCP)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve(args) => {
            let config = AnalyzerConfig::new(args.volatility_bin, args.plugin_timeout);
            let analyzer = VolatilityAnalyzer::with_default_plugins(&config);
            tracing::info!(
                "Registered plugins: {}",
                analyzer.registry().names().join(", ")
            );

            let addr = SocketAddr::new(args.host, args.port);
            server::api::serve(Arc::new(analyzer), addr).await?;
        }
        Command::Mcp(args) => {
            tracing::info!("vol-mcp server starting (API at {})", args.vol_url);

            let server = VolatilityMcpServer::new(args.vol_url, Duration::from_secs(args.timeout));
            if let Some(image_path) = args.image_path {
                server.configure_image(image_path);
            }

            let service = server
                .serve(stdio())
                .await
                .inspect_err(|e| tracing::error!("Server error: {}", e))?;

            tracing::info!("vol-mcp server running on stdio");
            service.waiting().await?;

            tracing::info!("vol-mcp server shutting down");
        }
    }

    Ok(())
}
