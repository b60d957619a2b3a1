//! Request/response types shared by the REST API and MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Plugin info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
}

/// Body of `GET /plugins`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PluginList {
    pub plugins: Vec<PluginInfo>,
}

/// Query string of the `/analyze` endpoints.
#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    /// Path to the memory dump file.
    pub image_path: String,
}

/// Error body returned by the REST API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

/// Request to set the memory image used by later tool calls.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetMemoryImageRequest {
    /// Path to the memory dump file (.raw/.vmem/.dmp) as seen by the REST server.
    pub image_path: String,
}
