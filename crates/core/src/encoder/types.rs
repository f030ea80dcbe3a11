//! Types for the encoder module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A job to encode one input file to one output file.
#[derive(Debug, Clone)]
pub struct EncodeJob {
    /// Caller-chosen identifier, echoed back in progress and outcome.
    pub job_id: String,
    /// Path to the lossless source file.
    pub input_path: PathBuf,
    /// Path the final M4A is written to. Must not already exist; use
    /// [`resolve_output_path`](super::resolve_output_path) to pick one.
    pub output_path: PathBuf,
}

/// Which of the two encode passes is being referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodePass {
    /// Pass 1: lossless intermediate + normalization metadata generation.
    Generate,
    /// Pass 2: AAC encode + normalization metadata embed.
    Embed,
}

impl fmt::Display for EncodePass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodePass::Generate => write!(f, "pass 1 (generate)"),
            EncodePass::Embed => write!(f, "pass 2 (embed)"),
        }
    }
}

/// Progress update emitted at pass boundaries.
///
/// The external encoder emits no incremental progress, so the only
/// observable checkpoints are 0.25 (entering pass 1) and 0.75 (entering
/// pass 2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeProgress {
    /// Job this update belongs to.
    pub job_id: String,
    /// Fraction complete, discrete: 0.25 or 0.75.
    pub progress: f32,
    /// The pass being entered.
    pub pass: EncodePass,
}

/// Result of a successful encode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeOutcome {
    /// Job identifier.
    pub job_id: String,
    /// Path of the produced M4A.
    pub output_path: PathBuf,
    /// Size of the output file in bytes.
    pub output_size_bytes: u64,
    /// Wall-clock duration of both passes in milliseconds.
    pub duration_ms: u64,
    /// Sample rate the probe reported for the input.
    pub source_sample_rate: u32,
    /// Whether pass 1 resampled down to the target rate.
    pub resampled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_display() {
        assert_eq!(EncodePass::Generate.to_string(), "pass 1 (generate)");
        assert_eq!(EncodePass::Embed.to_string(), "pass 2 (embed)");
    }

    #[test]
    fn test_progress_serialization() {
        let progress = EncodeProgress {
            job_id: "j-1".to_string(),
            progress: 0.25,
            pass: EncodePass::Generate,
        };
        let json = serde_json::to_string(&progress).unwrap();
        assert!(json.contains("\"pass\":\"generate\""));
        assert!(json.contains("0.25"));
    }
}
