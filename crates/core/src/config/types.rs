//! Top-level configuration types.

use serde::{Deserialize, Serialize};

use crate::analysis::AnalyzerConfig;
use crate::encoder::EncoderConfig;
use crate::scheduler::SchedulerConfig;

/// Whole-application configuration.
///
/// Every section is optional in the TOML file; missing sections take their
/// defaults. No ambient global state is consulted at run time — front ends
/// pass these values explicitly into the scheduler and encoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Encoder (afconvert/afinfo) settings.
    #[serde(default)]
    pub encoder: EncoderConfig,

    /// Analyzer (afclip) settings.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}
