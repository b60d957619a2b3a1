//! Name-keyed plugin registry.

use super::runner::resolve_volatility_bin;
use super::VolatilityPlugin;
use crate::server::types::PluginInfo;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Registered plugins in insertion order, indexed by name.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn VolatilityPlugin>>,
    index: HashMap<String, usize>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin under its name.
    ///
    /// A plugin with the same name is replaced in place and keeps its
    /// listing position.
    pub fn register(&mut self, plugin: Arc<dyn VolatilityPlugin>) {
        let name = plugin.name().to_string();
        match self.index.get(&name) {
            Some(&slot) => {
                warn!("Plugin {} registered twice; replacing previous registration", name);
                self.plugins[slot] = plugin;
            }
            None => {
                self.index.insert(name, self.plugins.len());
                self.plugins.push(plugin);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn VolatilityPlugin>> {
        self.index.get(name).map(|&slot| Arc::clone(&self.plugins[slot]))
    }

    /// Name and description of every plugin, in registration order.
    pub fn list(&self) -> Vec<PluginInfo> {
        self.plugins.iter().map(|p| p.info()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn VolatilityPlugin>> {
        self.plugins.iter()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Startup health check.
    ///
    /// The Volatility binary is checked once; if it is unusable no
    /// per-plugin checks run and exactly one message is returned.
    pub fn validate(&self, volatility_bin: Option<&Path>) -> Vec<String> {
        if let Err(e) = resolve_volatility_bin(volatility_bin) {
            return vec![e.to_string()];
        }

        self.plugins
            .iter()
            .filter_map(|p| {
                p.validate()
                    .err()
                    .map(|e| format!("Plugin {} validation failed: {}", p.name(), e))
            })
            .collect()
    }
}
