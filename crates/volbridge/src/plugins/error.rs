//! Error types for plugin lookup and execution.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while resolving or running an analysis plugin.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The Volatility executable is not configured or does not exist.
    #[error("{0}")]
    Configuration(String),

    /// No plugin is registered under the requested name.
    #[error("Plugin {0} not found")]
    PluginNotFound(String),

    /// Volatility exited with a non-zero status.
    #[error("Plugin {plugin} failed: {stderr}")]
    ExecutionFailed { plugin: String, stderr: String },

    /// Volatility did not finish within the configured timeout.
    #[error("Plugin {plugin} timed out after {timeout:?}")]
    Timeout { plugin: String, timeout: Duration },

    /// The process could not be started or awaited.
    #[error("Plugin {plugin} could not be executed: {source}")]
    Spawn {
        plugin: String,
        #[source]
        source: std::io::Error,
    },
}

impl AnalysisError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        AnalysisError::Configuration(msg.into())
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        AnalysisError::PluginNotFound(name.into())
    }

    /// True for errors the caller caused by naming an unknown plugin.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AnalysisError::PluginNotFound(_))
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = AnalysisError::not_found("malfind");
        assert_eq!(err.to_string(), "Plugin malfind not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_execution_failed_carries_stderr() {
        let err = AnalysisError::ExecutionFailed {
            plugin: "process".into(),
            stderr: "Unsatisfied requirement".into(),
        };
        assert_eq!(err.to_string(), "Plugin process failed: Unsatisfied requirement");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_configuration_message_is_verbatim() {
        let err = AnalysisError::configuration("VOLATILITY_BIN environment variable is not set");
        assert_eq!(err.to_string(), "VOLATILITY_BIN environment variable is not set");
    }
}
