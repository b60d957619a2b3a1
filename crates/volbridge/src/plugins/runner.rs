//! Process execution strategy shared by all Volatility-backed plugins.
//!
//! Runs `<bin> -f <image_path> <command>` and returns captured stdout. The
//! child is killed if the timeout elapses (`kill_on_drop`).

use super::error::{AnalysisError, AnalysisResult};
use crate::config::{AnalyzerConfig, VOLATILITY_BIN_ENV};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Check that the Volatility executable is configured and present on disk.
pub fn resolve_volatility_bin(bin: Option<&Path>) -> AnalysisResult<&Path> {
    let bin = match bin {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => {
            return Err(AnalysisError::configuration(format!(
                "{} environment variable is not set",
                VOLATILITY_BIN_ENV
            )))
        }
    };
    if !bin.exists() {
        return Err(AnalysisError::configuration(format!(
            "Volatility executable not found at {}",
            bin.display()
        )));
    }
    Ok(bin)
}

/// Invokes the Volatility executable.
#[derive(Debug, Clone)]
pub struct VolatilityRunner {
    bin: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl VolatilityRunner {
    pub fn new(config: &AnalyzerConfig) -> Self {
        VolatilityRunner {
            bin: config.volatility_bin.clone(),
            timeout: config.plugin_timeout,
        }
    }

    pub fn bin(&self) -> Option<&Path> {
        self.bin.as_deref()
    }

    /// Run one Volatility command against `image_path`.
    ///
    /// `plugin` is the registered name, used only for error messages.
    pub async fn run(&self, plugin: &str, command: &str, image_path: &str) -> AnalysisResult<String> {
        let bin = resolve_volatility_bin(self.bin())?;

        info!("Running {} ({}) on {}", plugin, command, image_path);
        let child = Command::new(bin)
            .arg("-f")
            .arg(image_path)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AnalysisError::Spawn {
                plugin: plugin.to_string(),
                source,
            })?;

        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(AnalysisError::Timeout {
                        plugin: plugin.to_string(),
                        timeout: limit,
                    })
                }
            },
            None => child.wait_with_output().await,
        };
        let output = waited.map_err(|source| AnalysisError::Spawn {
            plugin: plugin.to_string(),
            source,
        })?;

        if !output.status.success() {
            return Err(AnalysisError::ExecutionFailed {
                plugin: plugin.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("{} produced {} bytes", plugin, stdout.len());
        Ok(stdout)
    }
}
