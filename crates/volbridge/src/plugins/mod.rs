//! Volatility analysis plugins.
//!
//! Each plugin is a named capability that turns a memory image path into
//! text output. Plugins live in a [`registry::PluginRegistry`] and are run
//! through [`analyzer::VolatilityAnalyzer`].

pub mod analyzer;
pub mod error;
pub mod registry;
pub mod runner;
pub mod windows;

use crate::server::types::PluginInfo;
use async_trait::async_trait;
use error::AnalysisResult;

/// A named analysis capability.
#[async_trait]
pub trait VolatilityPlugin: Send + Sync {
    /// Unique registry key, also used in REST paths.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Run the plugin against a memory image and return its raw output.
    async fn run(&self, image_path: &str) -> AnalysisResult<String>;

    /// Plugin-specific startup check, run after the shared Volatility
    /// binary check has passed.
    fn validate(&self) -> AnalysisResult<()> {
        Ok(())
    }

    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: self.name().to_string(),
            description: self.description().to_string(),
        }
    }
}

/// In-memory plugins for tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::error::{AnalysisError, AnalysisResult};
    use super::VolatilityPlugin;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns a fixed output (or failure) and counts its runs.
    pub struct StaticPlugin {
        pub name: String,
        pub description: String,
        pub output: Result<String, String>,
        pub runs: Arc<AtomicUsize>,
    }

    impl StaticPlugin {
        pub fn ok(name: &str, output: &str) -> Self {
            StaticPlugin {
                name: name.into(),
                description: format!("{} description", name),
                output: Ok(output.into()),
                runs: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn failing(name: &str, stderr: &str) -> Self {
            StaticPlugin {
                output: Err(stderr.into()),
                ..StaticPlugin::ok(name, "")
            }
        }

        pub fn runs(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VolatilityPlugin for StaticPlugin {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            &self.description
        }

        async fn run(&self, _image_path: &str) -> AnalysisResult<String> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            self.output.clone().map_err(|stderr| AnalysisError::ExecutionFailed {
                plugin: self.name.clone(),
                stderr,
            })
        }
    }
}
