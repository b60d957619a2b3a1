//! Command-line interface.

use crate::config::{DEFAULT_PLUGIN_TIMEOUT_SECS, VOLATILITY_BIN_ENV, VOLATILITY_TIMEOUT_ENV};
use crate::server::tools::DEFAULT_VOL_URL;
use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Volatility 3 memory forensics over REST and MCP.
///
/// Examples:
///   VOLATILITY_BIN=/opt/volatility3/vol volbridge serve --port 8000
///   volbridge mcp --image /cases/mem.raw --url http://localhost:8000
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the Volatility REST API
    Serve(ServeArgs),
    /// Run the MCP tool server on stdio, backed by the REST API
    Mcp(McpArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to bind
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Path to the Volatility executable
    #[arg(long, value_name = "FILE", env = VOLATILITY_BIN_ENV)]
    pub volatility_bin: Option<PathBuf>,

    /// Seconds a single plugin run may take before it is killed (0 = no limit)
    #[arg(long, value_name = "SECS", env = VOLATILITY_TIMEOUT_ENV, default_value_t = DEFAULT_PLUGIN_TIMEOUT_SECS)]
    pub plugin_timeout: u64,
}

#[derive(Args, Debug)]
pub struct McpArgs {
    /// Path to the memory image file
    #[arg(short = 'i', long = "image", value_name = "PATH")]
    pub image_path: Option<String>,

    /// URL of the Volatility REST API
    #[arg(short = 'u', long = "url", value_name = "URL", env = "VOLBRIDGE_URL", default_value = DEFAULT_VOL_URL)]
    pub vol_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,
}
