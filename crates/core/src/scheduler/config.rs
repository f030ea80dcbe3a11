//! Configuration for the scheduler module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::encoder::OutputPolicy;

/// Worker-pool size appropriate for unattended batch runs, where nobody is
/// waiting on interactive feedback. The default of 4 suits interactive use;
/// the difference is policy, not structure.
pub const UNATTENDED_MAX_CONCURRENT: usize = 12;

/// Configuration for the conversion scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum items processed simultaneously.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Where converted files are written.
    #[serde(default)]
    pub output_policy: OutputPolicy,

    /// Directory for analyze-only throwaway outputs.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
}

fn default_max_concurrent() -> usize {
    4
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("clipgate")
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            output_policy: OutputPolicy::default(),
            temp_dir: default_temp_dir(),
        }
    }
}

impl SchedulerConfig {
    /// Sets the maximum concurrent items.
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    /// Sets the output policy.
    pub fn with_output_policy(mut self, policy: OutputPolicy) -> Self {
        self.output_policy = policy;
        self
    }

    /// Sets the temp directory.
    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = temp_dir;
        self
    }
}
