//! REST API over the plugin analyzer.
//!
//! Routes:
//! - `GET /plugins`
//! - `GET /analyze/{plugin_name}?image_path=...`
//! - `GET /analyze?image_path=...`

use crate::config::VOLATILITY_BIN_ENV;
use crate::plugins::analyzer::{BatchAnalysis, VolatilityAnalyzer};
use crate::plugins::error::AnalysisError;
use crate::server::types::{ErrorDetail, ImageQuery, PluginList};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Errors that stop the REST server from starting or running.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("invalid configuration: {}", .0.join("; "))]
    InvalidConfiguration(Vec<String>),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Maps analysis failures onto HTTP status codes.
pub struct ApiError(AnalysisError);

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = ErrorDetail {
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the API router.
pub fn build_router(analyzer: Arc<VolatilityAnalyzer>) -> Router {
    Router::new()
        .route("/plugins", get(list_plugins))
        .route("/analyze", get(analyze_memory))
        .route("/analyze/{plugin_name}", get(analyze_with_plugin))
        .layer(TraceLayer::new_for_http())
        .with_state(analyzer)
}

async fn list_plugins(State(analyzer): State<Arc<VolatilityAnalyzer>>) -> Json<PluginList> {
    Json(PluginList {
        plugins: analyzer.list_plugins(),
    })
}

async fn analyze_with_plugin(
    State(analyzer): State<Arc<VolatilityAnalyzer>>,
    Path(plugin_name): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let output = analyzer.analyze(&query.image_path, &plugin_name).await?;
    let mut body = Map::new();
    body.insert(plugin_name, Value::String(output));
    Ok(Json(body))
}

async fn analyze_memory(
    State(analyzer): State<Arc<VolatilityAnalyzer>>,
    Query(query): Query<ImageQuery>,
) -> Json<BatchAnalysis> {
    Json(analyzer.analyze_all(&query.image_path).await)
}

/// Log startup validation failures with remediation steps.
fn report_startup_errors(errors: &[String]) {
    error!("Configuration error: the following problems were detected during startup");
    for e in errors {
        error!("  - {}", e);
    }
    error!(
        "Set {} to the Volatility executable (or pass --volatility-bin), \
         make sure it points to a working Volatility 3 installation, then restart. \
         See https://volatility3.readthedocs.io/",
        VOLATILITY_BIN_ENV
    );
}

/// Validate plugins, then serve the API on `addr` until Ctrl-C.
///
/// Nothing is bound if validation fails.
pub async fn serve(analyzer: Arc<VolatilityAnalyzer>, addr: SocketAddr) -> Result<(), ServeError> {
    let errors = analyzer.validate_plugins();
    if !errors.is_empty() {
        report_startup_errors(&errors);
        return Err(ServeError::InvalidConfiguration(errors));
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Volatility REST API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(analyzer))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Volatility REST API shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::plugins::testing::StaticPlugin;
    use volhttp::HttpClient;

    fn analyzer() -> Arc<VolatilityAnalyzer> {
        let mut analyzer = VolatilityAnalyzer::new(&AnalyzerConfig::default());
        analyzer.register_plugin(Arc::new(StaticPlugin::ok("process", "PID\tName\n4\tSystem\n")));
        analyzer.register_plugin(Arc::new(StaticPlugin::failing("hashdump", "no SAM hive")));
        Arc::new(analyzer)
    }

    fn image() -> Query<ImageQuery> {
        Query(ImageQuery {
            image_path: "/tmp/mem.raw".into(),
        })
    }

    #[tokio::test]
    async fn test_list_plugins() {
        let Json(list) = list_plugins(State(analyzer())).await;
        let names: Vec<String> = list.plugins.into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["process", "hashdump"]);
    }

    #[tokio::test]
    async fn test_analyze_with_plugin_wraps_output() {
        let Json(body) = analyze_with_plugin(State(analyzer()), Path("process".into()), image())
            .await
            .ok()
            .unwrap();
        assert_eq!(body["process"], "PID\tName\n4\tSystem\n");
    }

    #[tokio::test]
    async fn test_unknown_plugin_is_404() {
        let err = analyze_with_plugin(State(analyzer()), Path("malfind".into()), image())
            .await
            .err()
            .unwrap();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failing_plugin_is_500() {
        let err = analyze_with_plugin(State(analyzer()), Path("hashdump".into()), image())
            .await
            .err()
            .unwrap();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_serve_refuses_to_start_without_bin() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let err = serve(analyzer(), addr).await.unwrap_err();
        match err {
            ServeError::InvalidConfiguration(errors) => {
                assert_eq!(errors, ["VOLATILITY_BIN environment variable is not set"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_routes_end_to_end() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, build_router(analyzer())).await.unwrap();
        });

        let base = url.clone();
        let (plugins, single, missing, batch) = tokio::task::spawn_blocking(move || {
            let client = HttpClient::default();
            let params = vec![("image_path".to_string(), "/tmp/mem.raw".to_string())];
            (
                client.get(&base, "plugins", &[]),
                client.get(&base, "analyze/process", &params),
                client.get(&base, "analyze/malfind", &params),
                client.get(&base, "analyze", &params),
            )
        })
        .await
        .unwrap();

        let listed: Value = serde_json::from_str(&plugins[0]).unwrap();
        assert_eq!(listed["plugins"][0]["name"], "process");
        assert_eq!(single, ["PID\tName", "4\tSystem"]);
        assert_eq!(missing, [r#"Error 404: {"detail":"Plugin malfind not found"}"#]);
        // First multi-line value of the batch object is the process table.
        assert_eq!(batch, ["PID\tName", "4\tSystem"]);
    }
}
