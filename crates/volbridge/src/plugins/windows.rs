//! Windows-family plugins backed by the Volatility CLI.

use super::error::AnalysisResult;
use super::runner::VolatilityRunner;
use super::VolatilityPlugin;
use async_trait::async_trait;
use std::sync::Arc;

/// Built-in plugins: (name, Volatility command, description).
pub const WINDOWS_PLUGINS: &[(&str, &str, &str)] = &[
    ("process", "windows.pslist.PsList", "Get process information from memory image"),
    ("connections", "windows.netscan.NetScan", "Get network connection information from memory image"),
    ("cmdline", "windows.cmdline.CmdLine", "Get command line information from memory image"),
    ("hashdump", "windows.hashdump.Hashdump", "Dump password hashes from memory image"),
    ("cachedump", "windows.cachedump.Cachedump", "Dump cached domain credentials from memory image"),
    ("lsadump", "windows.lsadump.Lsadump", "Dump LSA secrets from memory image"),
];

/// A plugin that runs one Volatility `windows.*` command.
pub struct WindowsPlugin {
    name: String,
    command: String,
    description: String,
    runner: Arc<VolatilityRunner>,
}

impl WindowsPlugin {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        description: impl Into<String>,
        runner: Arc<VolatilityRunner>,
    ) -> Self {
        WindowsPlugin {
            name: name.into(),
            command: command.into(),
            description: description.into(),
            runner,
        }
    }

    /// The Volatility command identifier, e.g. `windows.pslist.PsList`.
    pub fn command(&self) -> &str {
        &self.command
    }
}

#[async_trait]
impl VolatilityPlugin for WindowsPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(&self, image_path: &str) -> AnalysisResult<String> {
        self.runner.run(&self.name, self.command(), image_path).await
    }
}

/// Instantiate every entry of [`WINDOWS_PLUGINS`] against a shared runner.
pub fn default_plugins(runner: &Arc<VolatilityRunner>) -> Vec<WindowsPlugin> {
    WINDOWS_PLUGINS
        .iter()
        .map(|(name, command, desc)| WindowsPlugin::new(*name, *command, *desc, Arc::clone(runner)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;

    #[test]
    fn test_default_plugin_table() {
        let runner = Arc::new(VolatilityRunner::new(&AnalyzerConfig::default()));
        let plugins = default_plugins(&runner);
        let names: Vec<&str> = plugins.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            ["process", "connections", "cmdline", "hashdump", "cachedump", "lsadump"]
        );
        assert_eq!(plugins[1].command(), "windows.netscan.NetScan");
    }

    #[test]
    fn test_windows_plugin_has_no_extra_validation() {
        let runner = Arc::new(VolatilityRunner::new(&AnalyzerConfig::default()));
        let plugin = WindowsPlugin::new("process", "windows.pslist.PsList", "d", runner);
        assert!(plugin.validate().is_ok());
        assert_eq!(plugin.info().name, "process");
    }
}
