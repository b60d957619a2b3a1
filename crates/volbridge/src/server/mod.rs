//! Boundary adapters: the REST API and the MCP tool server.

pub mod api;
pub mod tools;
pub mod types;
