//! MCP tool definitions for the Volatility bridge.
//!
//! Each tool forwards to the REST API and returns the normalized response
//! lines as text content.

use crate::server::types::SetMemoryImageRequest;
use parking_lot::RwLock;
use rmcp::handler::server::{router::tool::ToolRouter, wrapper::Parameters};
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use volhttp::{HttpClient, QueryParams};

/// Default base URL of the REST API.
pub const DEFAULT_VOL_URL: &str = "http://localhost:8000";

const PROCESS_ENDPOINT: &str = "analyze/process";
/// Matches the registered `connections` plugin name (not `analyze/connection`).
const CONNECTIONS_ENDPOINT: &str = "analyze/connections";
const CMDLINE_ENDPOINT: &str = "analyze/cmdline";

fn lines_result(lines: Vec<String>) -> CallToolResult {
    CallToolResult::success(lines.into_iter().map(Content::text).collect())
}

/// The Volatility MCP server.
///
/// All tool calls share one `HttpClient`, so connections to the REST API
/// are pooled and reused across calls.
#[derive(Clone)]
pub struct VolatilityMcpServer {
    client: HttpClient,
    vol_url: String,
    image_path: Arc<RwLock<Option<String>>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl VolatilityMcpServer {
    pub fn new(vol_url: impl Into<String>, timeout: Duration) -> Self {
        VolatilityMcpServer {
            client: HttpClient::new(timeout),
            vol_url: vol_url.into().trim_end_matches('/').to_string(),
            image_path: Arc::new(RwLock::new(None)),
            tool_router: Self::tool_router(),
        }
    }

    /// Set the memory image path sent with every analysis request.
    pub fn configure_image(&self, image_path: impl Into<String>) {
        let image_path = image_path.into();
        info!("Memory image path set to: {}", image_path);
        *self.image_path.write() = Some(image_path);
    }

    pub fn image_path(&self) -> Option<String> {
        self.image_path.read().clone()
    }

    /// GET `<vol_url>/<endpoint>?image_path=...` on a blocking thread.
    ///
    /// `image_path` is omitted when no image has been configured.
    async fn query(&self, endpoint: &'static str) -> Vec<String> {
        let params: QueryParams = self
            .image_path()
            .map(|p| vec![("image_path".to_string(), p)])
            .unwrap_or_default();
        let client = self.client.clone();
        let base = self.vol_url.clone();

        tokio::task::spawn_blocking(move || client.get(&base, endpoint, &params))
            .await
            .unwrap_or_else(|e| vec![format!("Request failed: {}", e)])
    }

    #[tool(description = "Set the memory image (path on the analysis server) used by get_processes, get_connections and get_cmdline.")]
    async fn set_memory_image(
        &self,
        Parameters(req): Parameters<SetMemoryImageRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.configure_image(req.image_path.clone());
        Ok(CallToolResult::success(vec![Content::text(format!(
            "Memory image path set to: {}",
            req.image_path
        ))]))
    }

    #[tool(description = "Retrieve process information (Volatility windows.pslist) from the configured memory image.")]
    async fn get_processes(&self) -> Result<CallToolResult, McpError> {
        Ok(lines_result(self.query(PROCESS_ENDPOINT).await))
    }

    #[tool(description = "Retrieve network connection information (Volatility windows.netscan) from the configured memory image.")]
    async fn get_connections(&self) -> Result<CallToolResult, McpError> {
        Ok(lines_result(self.query(CONNECTIONS_ENDPOINT).await))
    }

    #[tool(description = "Retrieve process command lines (Volatility windows.cmdline) from the configured memory image.")]
    async fn get_cmdline(&self) -> Result<CallToolResult, McpError> {
        Ok(lines_result(self.query(CMDLINE_ENDPOINT).await))
    }
}

#[tool_handler]
impl ServerHandler for VolatilityMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "vol-mcp: Volatility 3 memory forensics over MCP. \
                 Tools query a running volbridge REST server. \
                 Call set_memory_image first unless the server was started with --image, \
                 then use get_processes, get_connections and get_cmdline. \
                 Each tool returns the plugin output one line per content item."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
