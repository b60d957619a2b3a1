//! Plugin dispatch: single-plugin and batch analysis of a memory image.

use super::error::{AnalysisError, AnalysisResult};
use super::registry::PluginRegistry;
use super::runner::VolatilityRunner;
use super::windows::default_plugins;
use super::VolatilityPlugin;
use crate::config::AnalyzerConfig;
use crate::server::types::PluginInfo;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of one plugin within a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginOutcome {
    Output(String),
    Failed(String),
}

impl PluginOutcome {
    fn from_result(result: AnalysisResult<String>) -> Self {
        match result {
            Ok(output) => PluginOutcome::Output(output),
            Err(e) => PluginOutcome::Failed(e.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PluginOutcome::Failed(_))
    }

    /// Output text, or `"Error: <message>"` for a failure.
    pub fn text(&self) -> String {
        match self {
            PluginOutcome::Output(output) => output.clone(),
            PluginOutcome::Failed(msg) => format!("Error: {}", msg),
        }
    }
}

impl Serialize for PluginOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PluginOutcome::Output(output) => serializer.serialize_str(output),
            PluginOutcome::Failed(_) => serializer.serialize_str(&self.text()),
        }
    }
}

/// Per-plugin outcomes of a batch run, in registration order.
///
/// Serializes as a JSON object `{plugin_name: text}`.
#[derive(Debug, Clone, Default)]
pub struct BatchAnalysis {
    results: Vec<(String, PluginOutcome)>,
}

impl BatchAnalysis {
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&PluginOutcome> {
        self.results.iter().find(|(n, _)| n == name).map(|(_, o)| o)
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PluginOutcome)> {
        self.results.iter().map(|(n, o)| (n.as_str(), o))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|(_, o)| o.is_failed()).count()
    }
}

impl Serialize for BatchAnalysis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for (name, outcome) in &self.results {
            map.serialize_entry(name, outcome)?;
        }
        map.end()
    }
}

/// Owns the plugin registry and dispatches analysis requests.
pub struct VolatilityAnalyzer {
    registry: PluginRegistry,
    runner: Arc<VolatilityRunner>,
}

impl VolatilityAnalyzer {
    /// An analyzer with an empty registry.
    pub fn new(config: &AnalyzerConfig) -> Self {
        VolatilityAnalyzer {
            registry: PluginRegistry::new(),
            runner: Arc::new(VolatilityRunner::new(config)),
        }
    }

    /// An analyzer with the built-in Windows plugins registered.
    pub fn with_default_plugins(config: &AnalyzerConfig) -> Self {
        let mut analyzer = Self::new(config);
        for plugin in default_plugins(&analyzer.runner) {
            analyzer.register_plugin(Arc::new(plugin));
        }
        analyzer
    }

    pub fn register_plugin(&mut self, plugin: Arc<dyn VolatilityPlugin>) {
        self.registry.register(plugin);
    }

    pub fn list_plugins(&self) -> Vec<PluginInfo> {
        self.registry.list()
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Validate the shared Volatility binary, then each plugin.
    pub fn validate_plugins(&self) -> Vec<String> {
        self.registry.validate(self.runner.bin())
    }

    /// Run one plugin. Unknown names fail before anything executes.
    pub async fn analyze(&self, image_path: &str, plugin_name: &str) -> AnalysisResult<String> {
        let plugin = self
            .registry
            .get(plugin_name)
            .ok_or_else(|| AnalysisError::not_found(plugin_name))?;
        plugin.run(image_path).await
    }

    /// Run every registered plugin in order.
    ///
    /// A failing plugin is recorded in its own slot and does not stop the
    /// remaining plugins.
    pub async fn analyze_all(&self, image_path: &str) -> BatchAnalysis {
        let mut results = Vec::with_capacity(self.registry.len());
        for plugin in self.registry.iter() {
            let outcome = PluginOutcome::from_result(plugin.run(image_path).await);
            if let PluginOutcome::Failed(msg) = &outcome {
                warn!("{} failed on {}: {}", plugin.name(), image_path, msg);
            }
            results.push((plugin.name().to_string(), outcome));
        }

        let batch = BatchAnalysis { results };
        info!(
            "Batch analysis of {} finished: {} plugins, {} failed",
            image_path,
            batch.len(),
            batch.failure_count()
        );
        batch
    }
}
