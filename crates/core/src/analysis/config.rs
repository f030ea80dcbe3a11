//! Configuration for the analysis module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the afclip-based analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Path to the afclip binary.
    #[serde(default = "default_afclip_path")]
    pub afclip_path: PathBuf,

    /// Timeout for one analysis run in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_afclip_path() -> PathBuf {
    PathBuf::from("afclip")
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            afclip_path: default_afclip_path(),
            timeout_secs: default_timeout(),
        }
    }
}

impl AnalyzerConfig {
    /// Creates a config with a custom afclip path.
    pub fn with_path(afclip_path: PathBuf) -> Self {
        Self {
            afclip_path,
            ..Default::default()
        }
    }

    /// Sets the analysis timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
