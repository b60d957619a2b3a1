//! Blocking HTTP client for the Volatility REST API.
//!
//! Every request resolves to a non-empty `Vec<String>` of text lines, whether
//! it succeeded or not:
//!
//! - transport failures and timeouts become `"Request failed: ..."`
//! - non-2xx responses become `"Error <status>: <body>"`
//! - JSON envelopes carrying multi-line plugin output are unwrapped and split
//! - anything else is split on line breaks
//!
//! # Example
//!
//! ```rust,ignore
//! use volhttp::HttpClient;
//!
//! let lines = HttpClient::http_get(
//!     "http://localhost:8000",
//!     "analyze/process",
//!     &[("image_path".into(), "/cases/mem.raw".into())],
//! );
//! ```

pub mod client;
pub mod error;
pub mod normalize;

// Re-export key types at crate root.
pub use client::{HttpClient, Method, QueryParams, DEFAULT_TIMEOUT};
pub use error::{HttpError, HttpResult};
pub use normalize::{normalize_response, render_json};
