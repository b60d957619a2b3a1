//! Analyzer configuration, resolved once at startup and passed explicitly.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the Volatility executable.
pub const VOLATILITY_BIN_ENV: &str = "VOLATILITY_BIN";

/// Environment variable overriding the per-plugin process timeout (seconds).
pub const VOLATILITY_TIMEOUT_ENV: &str = "VOLATILITY_TIMEOUT_SECS";

/// Default process timeout for a single plugin run (15 minutes).
pub const DEFAULT_PLUGIN_TIMEOUT_SECS: u64 = 900;

/// Settings for running Volatility plugins.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    /// Path to the Volatility executable (`vol`, `vol.py`, ...).
    pub volatility_bin: Option<PathBuf>,
    /// Upper bound on one plugin run. `None` waits indefinitely.
    pub plugin_timeout: Option<Duration>,
}

impl AnalyzerConfig {
    /// Build from CLI values. A timeout of 0 disables the bound.
    pub fn new(volatility_bin: Option<PathBuf>, plugin_timeout_secs: u64) -> Self {
        AnalyzerConfig {
            volatility_bin: volatility_bin.filter(|p| !p.as_os_str().is_empty()),
            plugin_timeout: (plugin_timeout_secs > 0)
                .then(|| Duration::from_secs(plugin_timeout_secs)),
        }
    }
}
