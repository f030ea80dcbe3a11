//! Error types for the analysis module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running the clip analyzer.
///
/// Note that a nonzero analyzer exit is not an error: the analyzer exits
/// nonzero when clipping is found, and its report is still parsed. These
/// variants all mean the analysis never ran, so no report exists.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The analyzer binary could not be found.
    #[error("Analyzer not found at path: {path}")]
    AnalyzerNotFound { path: PathBuf },

    /// The analyzer exceeded its timeout and was killed.
    #[error("Analysis timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while launching or supervising the analyzer process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
