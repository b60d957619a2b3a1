//! Blocking request executor built on `ureq`.
//!
//! Uses synchronous `ureq`; async callers run requests on a blocking thread
//! (`tokio::task::spawn_blocking`).

use crate::error::{HttpError, HttpResult};
use crate::normalize::normalize_response;
use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Query parameters, sent in order.
pub type QueryParams = Vec<(String, String)>;

/// Supported HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            _ => Err(format!("Unsupported HTTP method: {}", s)),
        }
    }
}

/// HTTP client that never fails: every outcome is a list of text lines.
#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    timeout: Duration,
}

impl Default for HttpClient {
    fn default() -> Self {
        HttpClient::new(DEFAULT_TIMEOUT)
    }
}

impl HttpClient {
    /// Create a client whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        HttpClient { agent, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform `method` against `<base_url>/<endpoint>`.
    pub fn request(
        &self,
        base_url: &str,
        endpoint: &str,
        method: &str,
        params: &[(String, String)],
        body: Option<&Value>,
    ) -> Vec<String> {
        let url = format!("{}/{}", base_url, endpoint);
        info!("Making {} request to: {}", method, url);
        self.execute(&url, method, params, body)
    }

    /// GET `<base_url>/<endpoint>` with query parameters.
    pub fn get(&self, base_url: &str, endpoint: &str, params: &[(String, String)]) -> Vec<String> {
        self.request(base_url, endpoint, Method::Get.as_str(), params, None)
    }

    /// POST a JSON body to `<base_url>/<endpoint>`.
    pub fn post(
        &self,
        base_url: &str,
        endpoint: &str,
        body: Option<&Value>,
        params: &[(String, String)],
    ) -> Vec<String> {
        self.request(base_url, endpoint, Method::Post.as_str(), params, body)
    }

    /// One-shot GET with a freshly built default client.
    pub fn http_get(base_url: &str, endpoint: &str, params: &[(String, String)]) -> Vec<String> {
        HttpClient::default().get(base_url, endpoint, params)
    }

    /// One-shot POST with a freshly built default client.
    pub fn http_post(
        base_url: &str,
        endpoint: &str,
        body: Option<&Value>,
        params: &[(String, String)],
    ) -> Vec<String> {
        HttpClient::default().post(base_url, endpoint, body, params)
    }

    /// Execute a single request against a full URL.
    ///
    /// Unsupported methods, transport errors and timeouts are all reported
    /// as a single line instead of an error.
    pub fn execute(
        &self,
        url: &str,
        method: &str,
        params: &[(String, String)],
        body: Option<&Value>,
    ) -> Vec<String> {
        let method = match method.parse::<Method>() {
            Ok(m) => m,
            Err(msg) => return vec![msg],
        };

        match self.send(url, method, params, body) {
            Ok((status, text)) => {
                info!("Response status: {}", status);
                let lines = normalize_response(status, &text);
                if !(200..300).contains(&status) {
                    error!("{}", lines[0]);
                }
                lines
            }
            Err(e) => {
                let msg = format!("Request failed: {}", e);
                error!("{}", msg);
                vec![msg]
            }
        }
    }

    fn send(
        &self,
        url: &str,
        method: Method,
        params: &[(String, String)],
        body: Option<&Value>,
    ) -> HttpResult<(u16, String)> {
        let mut req = self.agent.request(method.as_str(), url);
        for (key, value) in params {
            req = req.query(key, value);
        }

        let result = match (method, body) {
            (Method::Post, Some(body)) => {
                let payload = serde_json::to_string(body)?;
                req.set("Content-Type", "application/json")
                    .send_string(&payload)
            }
            _ => req.call(),
        };

        // Non-2xx responses still carry a body worth reporting.
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(t)) => return Err(HttpError::from(t)),
        };

        let status = response.status();
        let mut bytes = Vec::new();
        response.into_reader().read_to_end(&mut bytes)?;
        Ok((status, String::from_utf8_lossy(&bytes).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use std::net::TcpListener;
    use std::time::Instant;

    fn image_param() -> QueryParams {
        vec![("image_path".into(), "/tmp/mem.raw".into())]
    }

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!("get".parse::<Method>(), Ok(Method::Get));
        assert_eq!("Post".parse::<Method>(), Ok(Method::Post));
        assert!("DELETE".parse::<Method>().is_err());
    }

    #[test]
    fn test_unsupported_method_returns_message() {
        let client = HttpClient::default();
        let lines = client.execute("http://127.0.0.1:9/x", "PATCH", &[], None);
        assert_eq!(lines, vec!["Unsupported HTTP method: PATCH"]);
    }

    #[test]
    fn test_get_unwraps_plugin_envelope() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/analyze/process")
            .match_query(Matcher::UrlEncoded("image_path".into(), "/tmp/mem.raw".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"process": "PID\tImageFileName\n4\tSystem\n"}"#)
            .create();

        let lines = HttpClient::http_get(&server.url(), "analyze/process", &image_param());
        assert_eq!(lines, vec!["PID\tImageFileName", "4\tSystem"]);
        mock.assert();
    }

    #[test]
    fn test_error_status_is_reported() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/analyze/nope")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"detail":"Plugin nope not found"}"#)
            .create();

        let lines = HttpClient::default().get(&server.url(), "analyze/nope", &image_param());
        assert_eq!(lines, vec![r#"Error 404: {"detail":"Plugin nope not found"}"#]);
        mock.assert();
    }

    #[test]
    fn test_post_sends_json_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/jobs")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"plugin": "cmdline"})))
            .with_status(201)
            .with_body("queued")
            .create();

        let body = json!({"plugin": "cmdline"});
        let lines = HttpClient::http_post(&server.url(), "jobs", Some(&body), &[]);
        assert_eq!(lines, vec!["queued"]);
        mock.assert();
    }

    #[test]
    fn test_connection_refused_is_single_line() {
        // Bind then drop to get a port with nothing listening.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let lines = HttpClient::default().get(&format!("http://127.0.0.1:{}", port), "plugins", &[]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Request failed: "), "got {:?}", lines);
    }

    #[test]
    fn test_unresponsive_endpoint_times_out() {
        // Accepted by the kernel backlog but never answered.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let client = HttpClient::new(Duration::from_millis(300));
        let started = Instant::now();
        let lines = client.get(&url, "analyze", &image_param());

        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Request failed: "), "got {:?}", lines);
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(listener);
    }
}
